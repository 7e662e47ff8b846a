use crate::app_context::AppContext;
use crate::icons;
use crate::networks::NETWORKS;
use dioxus::prelude::*;

fn row_class(selected: bool) -> &'static str {
    if selected {
        "w-full flex items-center justify-between p-3 rounded-lg border-2 border-pink-500"
    } else {
        "w-full flex items-center justify-between p-3 rounded-lg border border-gray-200 hover:bg-gray-50 disabled:opacity-50"
    }
}

#[component]
pub fn NetworkList() -> Element {
    let ctx = use_context::<AppContext>();
    let selected = ctx.settings.read().network.clone();

    rsx! {
        div { class: "space-y-2",
            h3 { class: "text-sm font-medium text-gray-500 uppercase", "Networks" }
            for network in NETWORKS.iter() {
                button {
                    key: "{network.name}",
                    class: row_class(network.name.eq_ignore_ascii_case(&selected)),
                    disabled: !network.supported,
                    onclick: {
                        let ctx = ctx.clone();
                        let name = network.name;
                        move |_| {
                            log::info!("Network selected: {}", name);
                            ctx.update_settings(|settings| settings.network = name.to_lowercase());
                        }
                    },
                    div { class: "flex items-center",
                        img { class: "w-6 h-6 mr-3", src: "{network.logo}", alt: "{network.name}" }
                        span { class: "text-gray-900", "{network.name}" }
                    }
                    if network.supported {
                        icons::Radio { class: Some("w-4 h-4 text-green-600".to_string()) }
                    } else {
                        span { class: "text-xs text-gray-400", "Not supported" }
                    }
                }
            }
        }
    }
}
