//! User-facing side effects: notifications and navigation.
//!
//! Stores and the checkout flow never render anything. Whatever the user
//! should see (a toast, a redirect, a data refresh) is sent to a [`Shell`],
//! which the embedding front end implements. Tests use [`RecordingShell`].

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use mangaverse_core::{OrderId, ProductId};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
    /// A pending operation; stays up until dismissed by id.
    Loading,
}

/// A transient message for the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
    /// Stable id for notifications that are dismissed later.
    pub id: Option<&'static str>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// A loading notification with a dismiss id.
    pub fn loading(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(NoticeLevel::Loading, message)
        }
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            id: None,
        }
    }
}

/// Navigation targets of the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Shop,
    Product(ProductId),
    Cart,
    Checkout,
    Login,
    Register,
    ForgotPassword,
    OrderConfirmation(OrderId),
    MyOrders,
}

impl Route {
    /// URL path of the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Shop => "/shop".to_string(),
            Self::Product(id) => format!("/product/{id}"),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::Login => "/auth/login".to_string(),
            Self::Register => "/auth/register".to_string(),
            Self::ForgotPassword => "/auth/forgot-password".to_string(),
            Self::OrderConfirmation(id) => format!("/order-confirmation?orderId={id}"),
            Self::MyOrders => "/user/orders".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The presentation layer, as seen by stores and flows.
pub trait Shell: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: Notification);

    /// Dismiss a notification previously shown with `id`.
    fn dismiss(&self, id: &str);

    /// Navigate immediately.
    fn navigate(&self, route: Route);

    /// Navigate once `delay` has elapsed, leaving time to read a notification.
    fn navigate_after(&self, route: Route, delay: Duration);

    /// Re-fetch data shown on the current view.
    fn refresh(&self);
}

/// Everything a [`RecordingShell`] has been asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Notify(Notification),
    Dismiss(String),
    Navigate(Route),
    NavigateAfter(Route, Duration),
    Refresh,
}

/// A shell that records events in order.
#[derive(Debug, Default)]
pub struct RecordingShell {
    events: Mutex<Vec<ShellEvent>>,
}

impl RecordingShell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ShellEvent> {
        self.lock().clone()
    }

    /// Recorded notifications only.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ShellEvent::Notify(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages of recorded notifications at `level`.
    #[must_use]
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    /// The most recent navigation target, immediate or delayed.
    #[must_use]
    pub fn last_route(&self) -> Option<Route> {
        self.lock().iter().rev().find_map(|event| match event {
            ShellEvent::Navigate(route) | ShellEvent::NavigateAfter(route, _) => {
                Some(route.clone())
            }
            _ => None,
        })
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ShellEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: ShellEvent) {
        self.lock().push(event);
    }
}

impl Shell for RecordingShell {
    fn notify(&self, notification: Notification) {
        self.push(ShellEvent::Notify(notification));
    }

    fn dismiss(&self, id: &str) {
        self.push(ShellEvent::Dismiss(id.to_owned()));
    }

    fn navigate(&self, route: Route) {
        self.push(ShellEvent::Navigate(route));
    }

    fn navigate_after(&self, route: Route, delay: Duration) {
        self.push(ShellEvent::NavigateAfter(route, delay));
    }

    fn refresh(&self) {
        self.push(ShellEvent::Refresh);
    }
}

/// A shell that reports everything through `tracing`.
///
/// Used by headless front ends such as the CLI, where there is no view to
/// navigate; navigation is logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingShell;

impl Shell for TracingShell {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!("{}", notification.message);
            }
            NoticeLevel::Error => tracing::error!("{}", notification.message),
            NoticeLevel::Loading => tracing::info!("{}", notification.message),
        }
    }

    fn dismiss(&self, _id: &str) {}

    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "navigate");
    }

    fn navigate_after(&self, route: Route, delay: Duration) {
        tracing::debug!(route = %route, delay_ms = delay.as_millis(), "navigate (delayed)");
    }

    fn refresh(&self) {
        tracing::debug!("refresh");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Product(ProductId::new("p1")).path(), "/product/p1");
        assert_eq!(
            Route::OrderConfirmation(OrderId::new("o-42")).to_string(),
            "/order-confirmation?orderId=o-42"
        );
    }

    #[test]
    fn recording_shell_keeps_order() {
        let shell = RecordingShell::new();
        shell.notify(Notification::loading("work", "Working..."));
        shell.dismiss("work");
        shell.navigate(Route::Cart);
        shell.navigate_after(Route::Home, Duration::from_millis(1500));

        assert_eq!(shell.events().len(), 4);
        assert_eq!(shell.last_route(), Some(Route::Home));
        assert_eq!(shell.messages(NoticeLevel::Loading), vec!["Working..."]);

        shell.clear();
        assert!(shell.events().is_empty());
    }
}
