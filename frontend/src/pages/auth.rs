use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::identity::{auth_error_message, AuthOperation};
use crate::Services;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthView {
    SignIn,
    SignUp,
    Reset,
}

impl AuthView {
    fn title(self) -> &'static str {
        match self {
            AuthView::SignIn => "Welcome back",
            AuthView::SignUp => "Create an account",
            AuthView::Reset => "Reset your password",
        }
    }

    /// Submit button label, idle and in flight.
    fn button_labels(self) -> (&'static str, &'static str) {
        match self {
            AuthView::SignIn => ("Sign In", "Signing In..."),
            AuthView::SignUp => ("Sign Up", "Creating Account..."),
            AuthView::Reset => ("Send Reset Link", "Sending..."),
        }
    }
}

fn validate_sign_in(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FILL_ALL_FIELDS);
    }
    Ok(())
}

fn validate_sign_up(name: &str, email: &str, password: &str, confirm: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(FILL_ALL_FIELDS);
    }
    if password != confirm {
        return Err("Passwords do not match");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters long");
    }
    Ok(())
}

fn validate_reset(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Please enter your email address");
    }
    Ok(())
}

fn text_field(label: &'static str, kind: &'static str, value: &UseStateHandle<String>, disabled: bool) -> Html {
    let oninput = {
        let value = value.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            value.set(input.value());
        })
    };

    html! {
        <label class="block">
            <span class="text-[11px] font-bold uppercase tracking-widest text-muted-foreground">{ label }</span>
            <input
                type={kind}
                class="mt-1 w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary"
                value={(**value).clone()}
                {disabled}
                {oninput}
            />
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthScreenProps {
    pub services: Services,
    pub on_back: Callback<()>,
}

#[function_component(AuthScreen)]
pub fn auth_screen(props: &AuthScreenProps) -> Html {
    let view = use_state(|| AuthView::SignIn);
    let name = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let confirm = use_state(String::new);
    let error = use_state(|| None::<String>);
    let success = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let switch_to = |target: AuthView| {
        let view = view.clone();
        let error = error.clone();
        let success = success.clone();
        let password = password.clone();
        let confirm = confirm.clone();
        Callback::from(move |_: MouseEvent| {
            view.set(target);
            error.set(None);
            success.set(None);
            password.set(String::new());
            confirm.set(String::new());
        })
    };

    let onsubmit = {
        let identity = props.services.identity.clone();
        let view = view.clone();
        let name = name.clone();
        let email = email.clone();
        let password = password.clone();
        let confirm = confirm.clone();
        let error = error.clone();
        let success = success.clone();
        let loading = loading.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *loading {
                return;
            }

            let current = *view;
            let name_val = name.trim().to_string();
            let email_val = email.trim().to_string();
            let password_val = (*password).clone();

            let checked = match current {
                AuthView::SignIn => validate_sign_in(&email_val, &password_val),
                AuthView::SignUp => validate_sign_up(&name_val, &email_val, &password_val, &confirm),
                AuthView::Reset => validate_reset(&email_val),
            };
            if let Err(message) = checked {
                success.set(None);
                error.set(Some(message.to_string()));
                return;
            }

            error.set(None);
            success.set(None);
            loading.set(true);

            let identity = identity.clone();
            let error = error.clone();
            let success = success.clone();
            let loading = loading.clone();
            spawn_local(async move {
                let outcome = match current {
                    AuthView::SignIn => identity
                        .sign_in(&email_val, &password_val)
                        .await
                        .map(|_| "Login successful! Redirecting...".to_string())
                        .map_err(|err| auth_error_message(AuthOperation::SignIn, &err)),
                    AuthView::SignUp => identity
                        .sign_up(&name_val, &email_val, &password_val)
                        .await
                        .map(|_| "Account created successfully!".to_string())
                        .map_err(|err| auth_error_message(AuthOperation::SignUp, &err)),
                    AuthView::Reset => identity
                        .send_password_reset(&email_val)
                        .await
                        .map(|()| format!("Password reset email sent to {}", email_val))
                        .map_err(|err| auth_error_message(AuthOperation::PasswordReset, &err)),
                };

                match outcome {
                    Ok(message) => success.set(Some(message)),
                    Err(message) => {
                        tracing::warn!(view = ?current, "{}", message);
                        error.set(Some(message.to_string()));
                    }
                }
                loading.set(false);
            });
        })
    };

    let current = *view;
    let (idle_label, busy_label) = current.button_labels();
    let on_back = props.on_back.reform(|_: MouseEvent| ());

    html! {
        <div class="min-h-screen flex items-center justify-center bg-[#D8E1E8] p-6">
            <div class="w-full max-w-md bg-card rounded-[24px] shadow-lg p-8 space-y-6">
                <div class="text-center">
                    <span class="text-[#173E63] text-3xl font-black tracking-tight">{"SmartSpend"}</span>
                    <h2 class="mt-2 text-lg font-bold text-foreground">{ current.title() }</h2>
                </div>

                if let Some(message) = &*error {
                    <div class="px-4 py-2 rounded-lg bg-red-50 text-sm text-red-600">{ message.clone() }</div>
                }
                if let Some(message) = &*success {
                    <div class="px-4 py-2 rounded-lg bg-emerald-50 text-sm text-emerald-700">{ message.clone() }</div>
                }

                <form class="space-y-4" {onsubmit}>
                    if current == AuthView::SignUp {
                        { text_field("Name", "text", &name, *loading) }
                    }
                    { text_field("Email", "email", &email, *loading) }
                    if current != AuthView::Reset {
                        { text_field("Password", "password", &password, *loading) }
                    }
                    if current == AuthView::SignUp {
                        { text_field("Confirm Password", "password", &confirm, *loading) }
                    }
                    <button
                        type="submit"
                        class="w-full py-2 rounded-xl bg-[#173E63] text-white font-bold disabled:opacity-50"
                        disabled={*loading}
                    >
                        { if *loading { busy_label } else { idle_label } }
                    </button>
                </form>

                <div class="flex flex-col items-center gap-2 text-sm text-[#173E63]">
                    {
                        match current {
                            AuthView::SignIn => html! {
                                <>
                                    <button type="button" class="hover:underline" onclick={switch_to(AuthView::Reset)}>{"Forgot password?"}</button>
                                    <button type="button" class="hover:underline" onclick={switch_to(AuthView::SignUp)}>{"Don't have an account? Sign up"}</button>
                                </>
                            },
                            AuthView::SignUp | AuthView::Reset => html! {
                                <button type="button" class="hover:underline" onclick={switch_to(AuthView::SignIn)}>{"Back to sign in"}</button>
                            },
                        }
                    }
                    <button type="button" class="text-muted-foreground hover:underline" onclick={on_back}>{"Continue without signing in"}</button>
                </div>
            </div>
        </div>
    }
}
