use crate::domain::logging::{LogComponent, get_logger};
use leptos::ev::EventDescriptor;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event};

#[derive(Clone, Debug)]
pub struct EventOptions {
    pub passive: bool,
    pub capture: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self { passive: true, capture: false }
    }
}

/// Registered window listener. The callback stays alive until `remove`.
pub struct WindowEventListenerHandle {
    event_name: String,
    callback: Closure<dyn FnMut(Event)>,
    capture: bool,
    registered: bool,
}

impl WindowEventListenerHandle {
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn remove(self) {
        if !self.registered {
            return;
        }
        let Some(window) = web_sys::window() else { return };
        if window
            .remove_event_listener_with_callback_and_bool(
                &self.event_name,
                self.callback.as_ref().unchecked_ref(),
                self.capture,
            )
            .is_err()
        {
            get_logger().warn(
                LogComponent::Infrastructure("Events"),
                &format!("failed to remove '{}' listener", self.event_name),
            );
        }
    }
}

/// Adds a typed listener on `window`. Outside a browser the handle is
/// returned unregistered and the callback never fires.
pub fn window_event_listener_with_options<E>(
    event: E,
    options: &EventOptions,
    mut cb: impl FnMut(E::EventType) + 'static,
) -> WindowEventListenerHandle
where
    E: EventDescriptor + 'static,
    E::EventType: JsCast,
{
    let opts = AddEventListenerOptions::new();
    opts.set_passive(options.passive);
    opts.set_capture(options.capture);

    let event_name = event.name().into_owned();
    let callback = Closure::wrap(Box::new(move |ev: Event| {
        cb(ev.unchecked_into::<E::EventType>());
    }) as Box<dyn FnMut(Event)>);

    let registered = web_sys::window()
        .map(|window| {
            window
                .add_event_listener_with_callback_and_add_event_listener_options(
                    &event_name,
                    callback.as_ref().unchecked_ref(),
                    &opts,
                )
                .is_ok()
        })
        .unwrap_or(false);

    if !registered {
        get_logger().warn(
            LogComponent::Infrastructure("Events"),
            &format!("'{}' listener not registered", event_name),
        );
    }

    WindowEventListenerHandle { event_name, callback, capture: options.capture, registered }
}
