//! Moves session state between the store and a live browser context.

use crate::engine::EngineSession;
use crate::error::Result;
use crate::reddit;
use crate::session::snapshot::{self, StorageArea};
use crate::session::SessionRecord;

/// Replays a stored record into a fresh context.
///
/// Cookies go in before the first navigation so it is already authenticated;
/// storage is origin-scoped, so the platform origin must be open before the
/// snapshots are written.
pub(crate) async fn restore(
    session: &mut dyn EngineSession,
    record: &SessionRecord,
) -> Result<()> {
    if !record.cookies.is_empty() {
        session.set_cookies(&record.cookies).await?;
    }
    session.goto(reddit::ORIGIN).await?;
    session
        .evaluate(&snapshot::restore_script(
            StorageArea::Local,
            &record.local_storage,
        ))
        .await?;
    session
        .evaluate(&snapshot::restore_script(
            StorageArea::Session,
            &record.session_storage,
        ))
        .await?;
    Ok(())
}

/// Captures the live context's cookies and storage into a record.
pub(crate) async fn capture(session: &mut dyn EngineSession) -> Result<SessionRecord> {
    let cookies = session.cookies().await?;
    let local_storage = capture_area(session, StorageArea::Local).await?;
    let session_storage = capture_area(session, StorageArea::Session).await?;
    Ok(SessionRecord {
        cookies,
        local_storage,
        session_storage,
    })
}

async fn capture_area(session: &mut dyn EngineSession, area: StorageArea) -> Result<String> {
    let value = session.evaluate(&snapshot::capture_script(area)).await?;
    Ok(value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| "{}".to_string()))
}
