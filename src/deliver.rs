//! The two user-facing actions: convert-and-save and convert-and-preview.
//!
//! Both wrap a conversion in the same indicator protocol: `show()` before the
//! first input is read, `hide()` as soon as the conversion returns (success or
//! error) and before anything is written.

use crate::config::ConversionConfig;
use crate::convert::{convert, write_atomic};
use crate::error::Img2PdfError;
use crate::output::ConversionOutput;
use crate::progress::LoadingIndicator;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::info;

/// File name used when the caller does not choose one.
pub const DEFAULT_OUTPUT_NAME: &str = "output.pdf";

/// Height of the preview frame.
pub const PREVIEW_HEIGHT: &str = "500px";

/// Convert `inputs` and save the PDF to `dest`.
pub async fn convert_and_save<S: AsRef<str>>(
    inputs: &[S],
    dest: impl AsRef<Path>,
    config: &ConversionConfig,
    indicator: &dyn LoadingIndicator,
) -> Result<ConversionOutput, Img2PdfError> {
    let output = with_indicator(indicator, convert(inputs, config)).await?;
    let dest = dest.as_ref();
    write_atomic(dest, &output.pdf).await?;
    info!("Saved {}", dest.display());
    Ok(output)
}

/// Convert `inputs` and write an HTML page showing the PDF inline to `dest`.
pub async fn convert_and_preview<S: AsRef<str>>(
    inputs: &[S],
    dest: impl AsRef<Path>,
    config: &ConversionConfig,
    indicator: &dyn LoadingIndicator,
) -> Result<ConversionOutput, Img2PdfError> {
    let output = with_indicator(indicator, convert(inputs, config)).await?;
    let dest = dest.as_ref();
    write_atomic(dest, preview_html(&output.pdf).as_bytes()).await?;
    info!("Preview written to {}", dest.display());
    Ok(output)
}

/// Run `fut` with the indicator visible.
pub async fn with_indicator<T, F>(indicator: &dyn LoadingIndicator, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    indicator.show();
    let result = fut.await;
    indicator.hide();
    result
}

/// A `data:` URI carrying the whole PDF.
pub fn pdf_data_url(pdf: &[u8]) -> String {
    format!("data:application/pdf;base64,{}", STANDARD.encode(pdf))
}

/// Minimal HTML page embedding `pdf` in a full-width frame.
pub fn preview_html(pdf: &[u8]) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html>\n\
<head><meta charset=\"utf-8\"><title>PDF preview</title></head>\n\
<body>\n\
<iframe src=\"{}\" width=\"100%\" height=\"{}\"></iframe>\n\
</body>\n\
</html>\n",
        pdf_data_url(pdf),
        PREVIEW_HEIGHT
    )
}
