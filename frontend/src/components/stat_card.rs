use yew::prelude::*;

use crate::components::icons::{icon_credit_card, icon_trending_up, icon_wallet};
use crate::snapshot::Trend;

#[derive(Clone, Copy, PartialEq)]
pub enum StatIcon {
    Wallet,
    TrendingUp,
    CreditCard,
}

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub title: &'static str,
    /// Already formatted amount, or "Error".
    pub value: String,
    pub icon: StatIcon,
    #[prop_or_default]
    pub trend: Option<Trend>,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    let trend = props.trend.map(|trend| {
        let class_name = match trend {
            Trend::Up => "ml-2 text-sm text-emerald-600",
            Trend::Down => "ml-2 text-sm text-red-500",
        };
        html! { <span class={class_name}>{ trend.arrow() }</span> }
    });

    html! {
        <div class="bg-card p-6 rounded-[10px] shadow-sm border border-border flex justify-between items-start">
            <div>
                <p class="text-muted-foreground text-[10px] font-bold mb-1 tracking-widest">{ props.title }</p>
                <h3 class="text-2xl font-bold text-[#1D617A] tracking-tight">
                    { props.value.clone() }
                    { trend.unwrap_or_else(|| html! {}) }
                </h3>
            </div>
            <div class="p-3 bg-[#eef4f9] rounded-[10px]">
                {
                    match props.icon {
                        StatIcon::Wallet => icon_wallet(),
                        StatIcon::TrendingUp => icon_trending_up(),
                        StatIcon::CreditCard => icon_credit_card(),
                    }
                }
            </div>
        </div>
    }
}
