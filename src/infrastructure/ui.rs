use crate::config::DEFAULT_NOTIFICATION_CONTAINER;
use crate::domain::{
    errors::AppError,
    logging::{LogComponent, get_logger},
};

/// Sink for user-visible notifications
pub trait UiNotificationProvider {
    fn notify_error(&self, error: &AppError);
    fn clear_notifications(&self);
}

/// Writes notifications into a DOM container
#[derive(Debug, Clone)]
pub struct UiNotificationService {
    container_id: String,
}

impl Default for UiNotificationService {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CONTAINER)
    }
}

impl UiNotificationService {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self { container_id: container_id.into() }
    }

    fn container(&self) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(&self.container_id)
    }
}

impl UiNotificationProvider for UiNotificationService {
    fn notify_error(&self, error: &AppError) {
        get_logger().error(LogComponent::Infrastructure("UI"), &error.to_string());

        let Some(container) = self.container() else {
            get_logger().warn(
                LogComponent::Infrastructure("UI"),
                &format!("notification container '{}' not found in DOM", self.container_id),
            );
            return;
        };
        let Some(document) = container.owner_document() else { return };
        if let Ok(item) = document.create_element("div") {
            item.set_text_content(Some(&error.to_string()));
            let _ = item.set_attribute(
                "style",
                "padding: 10px; margin: 5px; background: #ffeeee; border: 1px solid #ff0000; border-radius: 5px;",
            );
            let _ = container.append_child(&item);
        }
    }

    fn clear_notifications(&self) {
        if let Some(container) = self.container() {
            container.set_inner_html("");
        }
    }
}

/// Notifications routed to the console only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationService;

impl UiNotificationProvider for LogNotificationService {
    fn notify_error(&self, error: &AppError) {
        get_logger().error(LogComponent::Infrastructure("UI"), &error.to_string());
    }

    fn clear_notifications(&self) {}
}

/// Notifier for a configured container id; an empty id logs only.
pub fn notifier_for(container_id: &str) -> Box<dyn UiNotificationProvider> {
    if container_id.trim().is_empty() {
        Box::new(LogNotificationService)
    } else {
        Box::new(UiNotificationService::new(container_id.trim()))
    }
}
