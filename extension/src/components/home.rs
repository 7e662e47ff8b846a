use super::{Balance, NetworkList};
use crate::app_context::AppContext;
use crate::icons;
use dioxus::prelude::*;

#[component]
pub fn Home() -> Element {
    let ctx = use_context::<AppContext>();
    let mut account_input = use_signal(String::new);
    let account = ctx.settings.read().selected_account.clone();

    let on_save = {
        let ctx = ctx.clone();
        move |_| {
            let address = account_input().trim().to_string();
            if address.is_empty() {
                return;
            }
            ctx.update_settings(|settings| settings.selected_account = Some(address));
            account_input.set(String::new());
        }
    };

    let on_forget = {
        let ctx = ctx.clone();
        move |_| {
            let mut settings = ctx.settings;
            let storage = ctx.storage;
            spawn(async move {
                match storage.clear().await {
                    Ok(()) => settings.set(Default::default()),
                    Err(e) => log::error!("Failed to clear storage: {}", e),
                }
            });
        }
    };

    rsx! {
        div { class: "max-w-md mx-auto mt-10 p-6 bg-white rounded-lg shadow-lg",
            h1 { class: "text-2xl font-bold text-gray-900 mb-6", "Speckle" }

            match account {
                Some(address) => rsx! {
                    Balance { address }
                    button {
                        class: "w-full mb-6 bg-gray-100 text-gray-700 py-2 px-4 rounded-lg hover:bg-gray-200 transition",
                        onclick: on_forget,
                        "Forget account"
                    }
                },
                None => rsx! {
                    div { class: "mb-6",
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Account address" }
                        input {
                            class: "w-full px-4 py-3 border border-gray-300 rounded-lg font-mono text-sm",
                            r#type: "text",
                            placeholder: "5Grw...",
                            value: "{account_input}",
                            oninput: move |e| account_input.set(e.value()),
                        }
                        button {
                            class: "w-full mt-3 bg-pink-600 text-white py-3 px-4 rounded-lg hover:bg-pink-700 transition disabled:opacity-50",
                            disabled: account_input().trim().is_empty(),
                            onclick: on_save,
                            div { class: "flex items-center justify-center",
                                icons::CheckCircle { class: Some("w-5 h-5 mr-2".to_string()) }
                                span { "Use this account" }
                            }
                        }
                    }
                },
            }

            NetworkList {}
        }
    }
}
