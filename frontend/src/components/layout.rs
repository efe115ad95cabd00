use yew::prelude::*;

use crate::api::UserStats;
use crate::components::icons::{icon_close, icon_log_in, icon_log_out, icon_menu};
use crate::format::Currency;
use crate::identity::User;

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub user: Option<User>,
    pub stats: Option<UserStats>,
    pub currency: Currency,
    pub open: bool,
    pub on_close: Callback<()>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    let container = if props.open {
        "fixed inset-y-0 left-0 z-40 flex md:static md:flex"
    } else {
        "hidden md:flex"
    };
    let on_close = props.on_close.reform(|_: MouseEvent| ());

    html! {
        <div class={container}>
            <div class="w-[220px] h-screen bg-[#D8E1E8] p-4 flex flex-col">
                <div class="flex items-center justify-between px-2 mb-8">
                    <span class="text-[#173E63] text-2xl font-black tracking-tight">{"SmartSpend"}</span>
                    <button class="md:hidden p-1" aria-label="Close menu" onclick={on_close}>
                        { icon_close() }
                    </button>
                </div>

                <div class="flex-1 bg-[#173E63] rounded-[24px] flex flex-col py-6 px-4 shadow-lg text-slate-200">
                    {
                        match &props.user {
                            Some(user) => html! {
                                <div class="mb-6">
                                    <p class="text-white font-bold truncate">{ user.display_label() }</p>
                                    <p class="text-xs text-slate-300 truncate">{ user.email.clone() }</p>
                                </div>
                            },
                            None => html! {
                                <p class="mb-6 text-sm text-slate-300">{"Not signed in"}</p>
                            },
                        }
                    }

                    <p class="mb-4 text-[10px] uppercase tracking-widest text-slate-400">{ format!("Amounts in {}", props.currency.code()) }</p>

                    if let Some(stats) = &props.stats {
                        <div class="space-y-3 text-[13px]">
                            <div>
                                <p class="text-[10px] uppercase tracking-widest text-slate-400">{"Balance"}</p>
                                <p class="font-bold text-white">{ props.currency.format(stats.balance) }</p>
                            </div>
                            <div>
                                <p class="text-[10px] uppercase tracking-widest text-slate-400">{"Transactions"}</p>
                                <p class="font-bold text-white">{ stats.transaction_count.to_string() }</p>
                            </div>
                        </div>
                    }
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub signed_in: bool,
    pub on_menu: Callback<()>,
    pub on_login: Callback<()>,
    pub on_logout: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_menu = props.on_menu.reform(|_: MouseEvent| ());
    let auth_button = if props.signed_in {
        let on_logout = props.on_logout.reform(|_: MouseEvent| ());
        html! {
            <button onclick={on_logout} class="flex items-center gap-2 px-4 py-2 rounded-xl hover:bg-white/40 transition-colors text-[13px] font-medium text-[#173E63]">
                { icon_log_out() }
                <span>{"Logout"}</span>
            </button>
        }
    } else {
        let on_login = props.on_login.reform(|_: MouseEvent| ());
        html! {
            <button onclick={on_login} class="flex items-center gap-2 px-4 py-2 rounded-xl hover:bg-white/40 transition-colors text-[13px] font-medium text-[#173E63]">
                { icon_log_in() }
                <span>{"Login"}</span>
            </button>
        }
    };

    html! {
        <header class="bg-[#D8E1E8] border-b border-border h-16 flex items-center justify-between px-6">
            <button class="md:hidden p-2 hover:bg-secondary rounded-full" aria-label="Open menu" onclick={on_menu}>
                { icon_menu() }
            </button>
            <div class="flex-1"></div>
            { auth_button }
        </header>
    }
}
