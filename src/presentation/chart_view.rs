use crate::application::ChartSession;
use crate::infrastructure::rendering::CanvasContainer;
use leptos::html::Canvas;
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Canvas bound to a chart session for as long as the view is mounted
#[component]
pub fn ChartView(
    session: Rc<RefCell<ChartSession>>,
    #[prop(into)] canvas_id: String,
    #[prop(default = 600)] height: u32,
) -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();

    let attach_session = Rc::clone(&session);
    let attach_id = canvas_id.clone();
    create_effect(move |attached: Option<bool>| {
        if attached == Some(true) || canvas_ref.get().is_none() {
            return attached.unwrap_or(false);
        }
        let container = CanvasContainer::new(attach_id.clone());
        attach_session.borrow_mut().attach(Box::new(container)).is_ok()
    });

    on_cleanup(move || session.borrow_mut().detach());

    view! {
        <canvas
            id=canvas_id
            node_ref=canvas_ref
            style=format!("width: 100%; height: {}px;", height)
        />
    }
}
