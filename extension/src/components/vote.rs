use crate::app_context::{AppContext, Poller};
use crate::error::ChainError;
use crate::governance::{cast_vote, load_referendum, ReferendumView, VoteIntent, VoteOutcome};
use crate::icons;
use crate::networks;
use crate::poller::{Loadable, PollFailure, Query};
use dioxus::prelude::*;
use futures::FutureExt;
use std::rc::Rc;

/// SI prefixes offered next to the tip input
const TIP_UNITS: &[(&str, i32)] = &[("", 0), ("m", -3), ("µ", -6)];

fn referendum_query(ctx: &AppContext, id: u32) -> Query<Option<ReferendumView>> {
    let ctx = ctx.clone();
    Rc::new(move || {
        let ctx = ctx.clone();
        async move {
            let properties = ctx.chain_properties().await?;
            load_referendum(ctx.client.as_ref(), properties, id).await
        }
        .boxed_local()
    })
}

fn vote_query(
    ctx: &AppContext,
    intent: VoteIntent,
    referendum: Rc<Poller<Option<ReferendumView>>>,
    loading: Signal<bool>,
) -> Query<()> {
    let ctx = ctx.clone();
    Rc::new(move || {
        let ctx = ctx.clone();
        let intent = intent.clone();
        let referendum = referendum.clone();
        let mut loading = loading;
        async move {
            let properties = ctx.chain_properties().await?;
            let outcome = cast_vote(ctx.client.as_ref(), &properties, intent, || loading.set(true)).await;
            loading.set(false);
            match outcome? {
                VoteOutcome::Included { .. } => {
                    referendum.refresh();
                }
                VoteOutcome::Rejected(reason) => log::error!("Vote not included: {}", reason),
            }
            Ok(())
        }
        .boxed_local()
    })
}

#[component]
pub fn Vote(network: String, id: u32) -> Element {
    let ctx = use_context::<AppContext>();
    let mut referendum = use_signal(|| Loadable::<Option<ReferendumView>>::Unresolved);
    let mut vote_error = use_signal(|| None::<String>);
    let loading = use_signal(|| false);
    let mut tip = use_signal(String::new);
    let mut tip_unit = use_signal(|| 0usize);

    let referendum_poller = use_hook(|| Rc::new(ctx.poller(move |update| referendum.set(update))));
    let vote_poller = use_hook(|| {
        let mut loading = loading;
        Rc::new(ctx.poller(move |update: Loadable<()>| {
            if let Loadable::Failed(failure) = update {
                loading.set(false);
                vote_error.set(Some(match failure {
                    PollFailure::Query(reason) => reason,
                    other => format!("Could not vote, chain {}", other),
                }));
            }
        }))
    });

    use_hook({
        let ctx = ctx.clone();
        let poller = referendum_poller.clone();
        move || {
            let query = referendum_query(&ctx, id);
            spawn(async move { poller.poll(query) });
        }
    });

    // Keep the tally current while the popup is open
    {
        let poller = referendum_poller.clone();
        let interval = ctx.config.vote.refresh_interval_ms;
        use_future(move || {
            let poller = poller.clone();
            async move {
                loop {
                    gloo_timers::future::TimeoutFuture::new(interval).await;
                    poller.refresh();
                }
            }
        });
    }

    {
        let referendum_poller = referendum_poller.clone();
        let vote_poller = vote_poller.clone();
        use_drop(move || {
            referendum_poller.teardown();
            vote_poller.teardown();
        });
    }

    let on_vote = {
        let ctx = ctx.clone();
        move |aye: bool| {
            let mut vote_error = vote_error;
            vote_error.set(None);
            let Some(address) = ctx.selected_account() else {
                vote_error.set(Some(ChainError::NoAccount.to_string()));
                return;
            };
            let intent = VoteIntent {
                address,
                referendum_id: id,
                aye,
                tip_input: tip(),
                si_power: TIP_UNITS[tip_unit()].1,
            };
            vote_poller.poll(vote_query(&ctx, intent, referendum_poller.clone(), loading));
        }
    };
    let on_aye = {
        let on_vote = on_vote.clone();
        move |_| on_vote(true)
    };
    let on_nay = move |_| on_vote(false);

    if !networks::find(&network).is_some_and(|n| n.supported) {
        return rsx! {
            div { class: "max-w-md mx-auto mt-10 p-6 bg-white rounded-lg shadow-lg",
                p { class: "text-gray-600", "Voting on {network} is not supported yet." }
            }
        };
    }

    rsx! {
        div { class: "max-w-md mx-auto mt-10 p-6 bg-white rounded-lg shadow-lg",
            h1 { class: "text-2xl font-bold text-gray-900 mb-4", "Referendum #{id}" }

            match referendum() {
                Loadable::Unresolved => rsx! {
                    div { class: "flex items-center text-gray-500",
                        icons::Loader { class: Some("w-4 h-4 mr-2 animate-spin".to_string()) }
                        "Loading referendum..."
                    }
                },
                Loadable::Loaded(None) => rsx! {
                    p { class: "text-gray-600", "No referendum #{id} on {network}." }
                },
                Loadable::Loaded(Some(view)) => rsx! {
                    Tally { view }
                },
                Loadable::Failed(failure) => rsx! {
                    p { class: "text-red-600", "Referendum not available: {failure}" }
                },
            }

            if let Some(error) = vote_error() {
                div { class: "mt-4 bg-red-50 border border-red-200 rounded-lg p-3 flex items-center text-sm text-red-700",
                    icons::AlertCircle { class: Some("w-4 h-4 mr-2".to_string()) }
                    span { "{error}" }
                }
            }

            div { class: "mt-6",
                label { class: "block text-sm font-medium text-gray-700 mb-2", "Tip (optional)" }
                div { class: "flex space-x-2",
                    input {
                        class: "flex-1 px-4 py-2 border border-gray-300 rounded-lg",
                        r#type: "text",
                        placeholder: "0",
                        value: "{tip}",
                        oninput: move |e| tip.set(e.value()),
                    }
                    select {
                        class: "px-2 py-2 border border-gray-300 rounded-lg",
                        onchange: move |e| tip_unit.set(e.value().parse().unwrap_or(0)),
                        for (i, (prefix, _)) in TIP_UNITS.iter().enumerate() {
                            option { value: "{i}", selected: i == tip_unit(), "{prefix}unit" }
                        }
                    }
                }
            }

            div { class: "grid grid-cols-2 gap-4 mt-6",
                button {
                    class: "bg-green-600 text-white py-3 px-4 rounded-lg hover:bg-green-700 transition disabled:opacity-50",
                    disabled: loading(),
                    onclick: on_aye,
                    if loading() { "Voting..." } else { "Aye" }
                }
                button {
                    class: "bg-red-600 text-white py-3 px-4 rounded-lg hover:bg-red-700 transition disabled:opacity-50",
                    disabled: loading(),
                    onclick: on_nay,
                    if loading() { "Voting..." } else { "Nay" }
                }
            }
        }
    }
}

#[component]
fn Tally(view: ReferendumView) -> Element {
    let aye = view.ballot.aye_percent();
    let nay = view.ballot.nay_percent();
    rsx! {
        div { class: "space-y-3",
            h2 { class: "font-mono text-sm text-gray-900", "{view.referendum.header()}" }
            if !view.referendum.documentation.is_empty() {
                p { class: "text-sm text-gray-600", "{view.referendum.documentation}" }
            }
            div {
                div { class: "flex justify-between text-sm", span { "{view.aye_label()}" } span { "{aye}%" } }
                div { class: "w-full h-2 bg-gray-200 rounded",
                    div { class: "h-2 bg-green-500 rounded", style: "width: {aye}%" }
                }
            }
            div {
                div { class: "flex justify-between text-sm", span { "{view.nay_label()}" } span { "{nay}%" } }
                div { class: "w-full h-2 bg-gray-200 rounded",
                    div { class: "h-2 bg-red-500 rounded", style: "width: {nay}%" }
                }
            }
            p { class: "text-xs text-gray-500", "{view.ballot.vote_count} votes" }
        }
    }
}
