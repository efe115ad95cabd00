use std::rc::Rc;

use tracing::error;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::chat::ChatBox;
use crate::components::icons::{icon_bar_chart, icon_pie_chart, icon_plus, icon_send};
use crate::components::layout::{Header, Sidebar};
use crate::components::stat_card::{StatCard, StatIcon};
use crate::controller::{DashboardController, Mode, SIGNED_OUT_NOTICE};
use crate::format::Currency;
use crate::identity::AuthEvent;
use crate::snapshot::SnapshotView;
use crate::Services;

fn mode_icon(mode: Mode) -> Html {
    match mode {
        Mode::AddTransaction => icon_plus(),
        Mode::FinancialAnalysis => icon_bar_chart(),
        Mode::ExpenseBreakdown => icon_pie_chart(),
    }
}

/// Formatted (balance, deposits, expenses) for the stat cards.
fn snapshot_values(view: &SnapshotView, currency: &Currency) -> (String, String, String) {
    match view {
        SnapshotView::Ready { snapshot, .. } => (
            currency.format(snapshot.balance),
            currency.format(snapshot.total_deposits),
            currency.format(snapshot.total_expenses),
        ),
        SnapshotView::Failed => ("Error".to_string(), "Error".to_string(), "Error".to_string()),
    }
}

#[derive(Properties, PartialEq)]
pub struct DashboardPageProps {
    pub services: Services,
    pub on_login: Callback<()>,
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &DashboardPageProps) -> Html {
    let trigger = use_force_update();
    let controller = {
        let services = props.services.clone();
        use_state(move || {
            Rc::new(DashboardController::new(
                services.api.clone(),
                services.config.clone(),
                Callback::from(move |_| trigger.force_update()),
            ))
        })
    };
    let controller: Rc<DashboardController> = (*controller).clone();

    let input = use_state(String::new);
    let sidebar_open = use_state(|| false);

    {
        let controller = controller.clone();
        let identity = props.services.identity.clone();
        use_effect_with_deps(
            move |_| {
                let id = identity.subscribe(Callback::from(move |event: AuthEvent| {
                    let controller = controller.clone();
                    spawn_local(async move {
                        controller.handle_auth_event(event).await;
                    });
                }));
                move || identity.unsubscribe(id)
            },
            (),
        );
    }

    let on_send = {
        let controller = controller.clone();
        let input = input.clone();
        Callback::from(move |_: ()| {
            if let Some(submission) = controller.prepare_submit(&input) {
                input.set(String::new());
                let controller = controller.clone();
                spawn_local(async move {
                    controller.dispatch(submission).await;
                });
            }
        })
    };

    let on_keypress = {
        let on_send = on_send.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                on_send.emit(());
            }
        })
    };

    let on_logout = {
        let identity = props.services.identity.clone();
        let on_login = props.on_login.clone();
        Callback::from(move |_| {
            let identity = identity.clone();
            let on_login = on_login.clone();
            spawn_local(async move {
                match identity.sign_out().await {
                    Ok(()) => on_login.emit(()),
                    Err(err) => error!(error = %err, "sign out failed"),
                }
            });
        })
    };

    let toggle_sidebar = {
        let sidebar_open = sidebar_open.clone();
        Callback::from(move |_| sidebar_open.set(!*sidebar_open))
    };

    let state = controller.state().clone();
    let currency = controller.currency().clone();
    let enabled = state.controls_enabled();
    let (balance, deposits, expenses) = snapshot_values(&state.snapshot, &currency);
    let trend = match &state.snapshot {
        SnapshotView::Ready { trend, .. } => *trend,
        SnapshotView::Failed => None,
    };
    let placeholder = (!enabled).then(|| AttrValue::from(SIGNED_OUT_NOTICE));

    html! {
        <div class="flex h-screen bg-background">
            <Sidebar
                user={state.session.clone()}
                stats={state.stats.clone()}
                currency={currency.clone()}
                open={*sidebar_open}
                on_close={toggle_sidebar.clone()}
            />

            <div class="flex-1 flex flex-col overflow-hidden">
                <Header
                    signed_in={enabled}
                    on_menu={toggle_sidebar}
                    on_login={props.on_login.clone()}
                    on_logout={on_logout}
                />
                <main class="flex-1 overflow-y-auto p-6 space-y-6">
                    <div>
                        <h1 class="text-2xl font-bold text-[#173E63]">{"Dashboard"}</h1>
                        <p class="text-sm text-muted-foreground">{ state.caption.clone() }</p>
                    </div>

                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                        <StatCard title="BALANCE" value={balance} icon={StatIcon::Wallet} trend={trend} />
                        <StatCard title="TOTAL DEPOSITS" value={deposits} icon={StatIcon::TrendingUp} />
                        <StatCard title="TOTAL EXPENSES" value={expenses} icon={StatIcon::CreditCard} />
                    </div>

                    <div class="flex flex-wrap gap-3">
                        { for Mode::all().into_iter().map(|mode| {
                            let class_name = if state.mode == Some(mode) {
                                "flex items-center gap-2 px-4 py-2 rounded-xl text-[13px] font-medium bg-[#173E63] text-white"
                            } else {
                                "flex items-center gap-2 px-4 py-2 rounded-xl text-[13px] font-medium bg-[#eef4f9] text-[#173E63] disabled:opacity-50"
                            };
                            let controller = controller.clone();
                            let onclick = Callback::from(move |_: MouseEvent| {
                                let controller = controller.clone();
                                spawn_local(async move {
                                    controller.select_mode(mode).await;
                                });
                            });
                            html! {
                                <button type="button" class={class_name} data-option={mode.as_str()} disabled={!enabled} {onclick}>
                                    { mode_icon(mode) }
                                    <span>{ mode.label() }</span>
                                </button>
                            }
                        }) }
                    </div>

                    <ChatBox messages={state.messages.clone()} placeholder={placeholder} />

                    if let Some(message) = &state.error {
                        <div class="px-4 py-2 rounded-lg bg-red-50 text-sm text-red-600">{ message.clone() }</div>
                    }

                    <div class="flex items-center gap-3">
                        <input
                            type="text"
                            class="flex-1 px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary"
                            placeholder="Type your message..."
                            disabled={!enabled}
                            value={(*input).clone()}
                            oninput={{
                                let input = input.clone();
                                Callback::from(move |e: InputEvent| {
                                    let field: HtmlInputElement = e.target_unchecked_into();
                                    input.set(field.value());
                                })
                            }}
                            onkeypress={on_keypress}
                        />
                        if state.busy {
                            <span class="w-5 h-5 border-2 border-[#173E63] border-t-transparent rounded-full animate-spin"></span>
                        }
                        <button
                            type="button"
                            class="p-3 rounded-xl bg-[#173E63] text-white disabled:opacity-50"
                            aria-label="Send"
                            disabled={!enabled}
                            onclick={on_send.reform(|_: MouseEvent| ())}
                        >
                            { icon_send() }
                        </button>
                    </div>
                </main>
            </div>
        </div>
    }
}
