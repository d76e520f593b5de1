use std::path::{Path, PathBuf};

use tokio::fs;

use crate::core::translator::languages::display_name;
use crate::shared::error::AppResult;
use crate::shared::types::LangTag;

/// Fixed name of the exported document.
pub const EXPORT_FILENAME: &str = "translation.txt";

/// Write the labeled original/translation pair as a plain-text document
/// under `dir`, returning the path of the written file.
pub async fn export_translation(
    dir: &Path,
    text: &str,
    translation: &str,
    from: &LangTag,
    to: &LangTag,
) -> AppResult<PathBuf> {
    let content = format!(
        "Original ({}):\n{}\n\nTranslation ({}):\n{}",
        display_name(from),
        text,
        display_name(to),
        translation
    );

    fs::create_dir_all(dir).await?;
    let path = dir.join(EXPORT_FILENAME);
    fs::write(&path, content).await?;
    Ok(path)
}

/// Read a plain-text file whose full contents replace the source text.
pub async fn import_source(path: &Path) -> AppResult<String> {
    Ok(fs::read_to_string(path).await?)
}
