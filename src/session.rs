//! Session key constants and the one-shot flash notices.

use tower_sessions::Session;

use crate::error::AppResult;

pub const USER_ID: &str = "user_id";
pub const RETURN_TO: &str = "return_to";
pub const FLASH_SUCCESS: &str = "flash.success";
pub const FLASH_ERROR: &str = "flash.error";

pub async fn flash_success(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_SUCCESS, message).await?;
    Ok(())
}

pub async fn flash_error(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_ERROR, message).await?;
    Ok(())
}

/// Reads and clears both flash slots. A notice is surfaced on exactly one
/// rendered page.
pub async fn take_flash(session: &Session) -> AppResult<(Option<String>, Option<String>)> {
    let success = session.remove::<String>(FLASH_SUCCESS).await?;
    let error = session.remove::<String>(FLASH_ERROR).await?;
    Ok((success, error))
}
