// Lucide icon components for Dioxus

use dioxus::prelude::*;

#[component]
fn IconFrame(class: Option<String>, children: Element) -> Element {
    rsx! {
        svg {
            class: "{class.unwrap_or_default()}",
            xmlns: "http://www.w3.org/2000/svg",
            width: "24",
            height: "24",
            view_box: "0 0 24 24",
            fill: "none",
            stroke: "currentColor",
            stroke_width: "2",
            stroke_linecap: "round",
            stroke_linejoin: "round",
            {children}
        }
    }
}

#[component]
pub fn Radio(class: Option<String>) -> Element {
    rsx! {
        IconFrame { class,
            path { d: "M4.9 19.1C1 15.2 1 8.8 4.9 4.9" }
            path { d: "M7.8 16.2c-2.3-2.3-2.3-6.1 0-8.5" }
            circle { cx: "12", cy: "12", r: "2" }
            path { d: "M16.2 7.8c2.3 2.3 2.3 6.1 0 8.5" }
            path { d: "M19.1 4.9C23 8.8 23 15.1 19.1 19" }
        }
    }
}

#[component]
pub fn CheckCircle(class: Option<String>) -> Element {
    rsx! {
        IconFrame { class,
            circle { cx: "12", cy: "12", r: "10" }
            path { d: "m9 12 2 2 4-4" }
        }
    }
}

#[component]
pub fn AlertCircle(class: Option<String>) -> Element {
    rsx! {
        IconFrame { class,
            circle { cx: "12", cy: "12", r: "10" }
            line { x1: "12", x2: "12", y1: "8", y2: "12" }
            line { x1: "12", x2: "12.01", y1: "16", y2: "16" }
        }
    }
}

#[component]
pub fn Loader(class: Option<String>) -> Element {
    rsx! {
        IconFrame { class,
            path { d: "M21 12a9 9 0 1 1-6.219-8.56" }
        }
    }
}

#[component]
pub fn Wallet(class: Option<String>) -> Element {
    rsx! {
        IconFrame { class,
            path { d: "M19 7V4a1 1 0 0 0-1-1H5a2 2 0 0 0 0 4h15a1 1 0 0 1 1 1v4h-3a2 2 0 0 0 0 4h3a1 1 0 0 0 1-1v-2a1 1 0 0 0-1-1" }
            path { d: "M3 5v14a2 2 0 0 0 2 2h15a1 1 0 0 0 1-1v-4" }
        }
    }
}
