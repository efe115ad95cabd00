mod analysis;
mod api;
mod breakdown;
mod components;
mod config;
mod controller;
mod error;
mod format;
mod identity;
mod logging;
mod pages;
mod snapshot;

use std::rc::Rc;

use yew::prelude::*;

use crate::api::{FinanceApi, HttpFinanceApi};
use crate::config::AppConfig;
use crate::identity::{AuthEvent, FirebaseIdentity, IdentityProvider};
use crate::pages::auth::AuthScreen;
use crate::pages::dashboard::DashboardPage;

/// Collaborators shared by every page, built once per page load.
#[derive(Clone)]
pub struct Services {
    pub api: Rc<dyn FinanceApi>,
    pub identity: Rc<dyn IdentityProvider>,
    pub config: Rc<AppConfig>,
}

impl Services {
    fn from_config(config: AppConfig) -> Self {
        Self {
            api: Rc::new(HttpFinanceApi::new(&config.api_base_url)),
            identity: Rc::new(FirebaseIdentity::new(&config.identity_api_key)),
            config: Rc::new(config),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
            && Rc::ptr_eq(&self.identity, &other.identity)
            && Rc::ptr_eq(&self.config, &other.config)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Page {
    Dashboard,
    Auth,
}

#[derive(Properties, PartialEq)]
struct AppProps {
    config: AppConfig,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let services = {
        let config = props.config.clone();
        use_state(move || Services::from_config(config))
    };
    let active_page = use_state(|| Page::Dashboard);

    {
        let identity = services.identity.clone();
        let active_page = active_page.clone();
        use_effect_with_deps(
            move |_| {
                let id = identity.subscribe(Callback::from(move |event: AuthEvent| {
                    if let AuthEvent::SignedIn(_) = event {
                        active_page.set(Page::Dashboard);
                    }
                }));
                move || identity.unsubscribe(id)
            },
            (),
        );
    }

    let on_login = {
        let active_page = active_page.clone();
        Callback::from(move |_| active_page.set(Page::Auth))
    };
    let on_back = {
        let active_page = active_page.clone();
        Callback::from(move |_| active_page.set(Page::Dashboard))
    };

    match *active_page {
        Page::Dashboard => html! {
            <DashboardPage services={(*services).clone()} on_login={on_login} />
        },
        Page::Auth => html! {
            <AuthScreen services={(*services).clone()} on_back={on_back} />
        },
    }
}

fn main() {
    let config = AppConfig::load();
    logging::init(&config.log_level);
    tracing::info!(api = %config.api_base_url, currency = %config.currency_code, "starting dashboard");
    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
