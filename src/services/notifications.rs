//! Notification fan-out
//!
//! Marketplace state transitions (new request, new offer, offer accepted,
//! request completed) are fanned out as persisted notification rows.
//! External delivery channels hang off these rows; this service only
//! records them and logs the fan-out.

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::NotificationKind;
use crate::roles::Role;

#[derive(Clone)]
pub struct NotificationService {
    database: Database,
}

impl NotificationService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Record a notification for one user. Failures are logged and
    /// swallowed: notification loss must never fail the triggering
    /// operation.
    pub async fn notify(&self, user_id: Uuid, kind: NotificationKind, body: &str) {
        match self.database.create_notification(user_id, kind, body).await {
            Ok(notification) => {
                info!(
                    user_id = %user_id,
                    kind = kind.as_str(),
                    notification_id = %notification.id,
                    "Notification recorded"
                );
            }
            Err(e) => {
                warn!(user_id = %user_id, kind = kind.as_str(), error = %e, "Failed to record notification");
            }
        }
    }

    /// Fan a notification out to every active holder of a role
    /// (coordinators learn about every new request).
    pub async fn notify_role(&self, role: Role, kind: NotificationKind, body: &str) -> AppResult<()> {
        let recipients = self.database.list_users_by_role(role).await?;
        info!(
            role = role.as_str(),
            kind = kind.as_str(),
            recipients = recipients.len(),
            "Fanning out notification"
        );
        for user in recipients {
            self.notify(user.id, kind, body).await;
        }
        Ok(())
    }
}
