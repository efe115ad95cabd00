//! Email/password identity provider and auth-state subscription.

use std::cell::RefCell;

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;
use yew::Callback;

use crate::error::{AuthError, AuthErrorCode};

const SESSION_KEY: &str = "smartspend.session";
const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub id_token: String,
}

impl User {
    /// Display name if set, otherwise the local part of the email.
    pub fn display_label(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

impl AuthEvent {
    fn from_user(user: Option<User>) -> Self {
        match user {
            Some(user) => AuthEvent::SignedIn(user),
            None => AuthEvent::SignedOut,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Current user plus the callbacks listening for changes to it.
#[derive(Default)]
pub struct AuthSubscribers {
    current: Option<User>,
    listeners: Vec<(SubscriptionId, Callback<AuthEvent>)>,
    next_id: u64,
}

impl AuthSubscribers {
    pub fn new(current: Option<User>) -> Self {
        Self {
            current,
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Registers `callback` and returns the event it should be told about right away.
    pub fn subscribe(&mut self, callback: Callback<AuthEvent>) -> (SubscriptionId, AuthEvent) {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, callback));
        (id, AuthEvent::from_user(self.current.clone()))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }

    /// Records the new user and returns the listeners to notify.
    pub fn publish(&mut self, user: Option<User>) -> (AuthEvent, Vec<Callback<AuthEvent>>) {
        self.current = user.clone();
        let listeners = self.listeners.iter().map(|(_, cb)| cb.clone()).collect();
        (AuthEvent::from_user(user), listeners)
    }
}

#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// `callback` is invoked at once with the current state and again on every change.
    fn subscribe(&self, callback: Callback<AuthEvent>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthOperation {
    SignIn,
    SignUp,
    PasswordReset,
}

/// User-facing text for a failed identity operation.
pub fn auth_error_message(operation: AuthOperation, error: &AuthError) -> &'static str {
    use AuthErrorCode::*;

    let code = error.code();
    match operation {
        AuthOperation::SignIn => match code {
            Some(InvalidEmail) => "Invalid email address format.",
            Some(UserDisabled) => "This account has been disabled.",
            Some(UserNotFound) => "No account found with this email.",
            Some(WrongPassword) => "Incorrect password.",
            Some(InvalidCredentials) => "Incorrect email or password.",
            Some(TooManyRequests) => "Too many attempts. Account temporarily locked.",
            _ => "Login failed. Please try again.",
        },
        AuthOperation::SignUp => match code {
            Some(EmailAlreadyInUse) => "This email is already registered.",
            Some(InvalidEmail) => "Invalid email address.",
            Some(WeakPassword) => "Password should be at least 6 characters.",
            Some(OperationNotAllowed) => "Email/password accounts are not enabled.",
            _ => "Signup failed. Please try again.",
        },
        AuthOperation::PasswordReset => match code {
            Some(UserNotFound) => "No account found with this email.",
            Some(InvalidEmail) => "Invalid email address.",
            _ => "Failed to send reset email. Please try again.",
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResetBody<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

fn provider_error(raw: &str) -> AuthError {
    match serde_json::from_str::<ProviderErrorBody>(raw) {
        Ok(body) => AuthError::Provider(AuthErrorCode::from_provider_message(&body.error.message)),
        Err(err) => AuthError::Decode(err.to_string()),
    }
}

fn load_stored_session() -> Option<User> {
    let raw = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(SESSION_KEY).ok().flatten())?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "discarding unreadable stored session");
            None
        }
    }
}

fn store_session(user: Option<&User>) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            match user.map(serde_json::to_string) {
                Some(Ok(raw)) => {
                    let _ = storage.set_item(SESSION_KEY, &raw);
                }
                Some(Err(_)) | None => {
                    let _ = storage.remove_item(SESSION_KEY);
                }
            }
        }
    }
}

/// `user_id` cookie used by the backend to correlate same-origin requests.
fn set_user_cookie(uid: Option<&str>) {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.dyn_into::<HtmlDocument>().ok());
    if let Some(document) = document {
        let cookie = match uid {
            Some(uid) => format!("user_id={}; path=/", urlencoding::encode(uid)),
            None => "user_id=; path=/; max-age=0".to_string(),
        };
        let _ = document.set_cookie(&cookie);
    }
}

/// Firebase Authentication over its REST API. The session survives reloads
/// through local storage.
pub struct FirebaseIdentity {
    api_key: String,
    subscribers: RefCell<AuthSubscribers>,
}

impl FirebaseIdentity {
    pub fn new(api_key: &str) -> Self {
        let restored = load_stored_session();
        if let Some(user) = &restored {
            info!(uid = %user.uid, "restored stored session");
        }
        Self {
            api_key: api_key.to_string(),
            subscribers: RefCell::new(AuthSubscribers::new(restored)),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", IDENTITY_BASE_URL, method, self.api_key)
    }

    async fn post<B: Serialize>(&self, method: &str, body: &B) -> Result<String, AuthError> {
        let resp = Request::post(&self.endpoint(method))
            .json(body)?
            .send()
            .await?;
        let raw = resp.text().await?;
        if resp.ok() {
            Ok(raw)
        } else {
            Err(provider_error(&raw))
        }
    }

    fn publish(&self, user: Option<User>) {
        store_session(user.as_ref());
        let (event, listeners) = self.subscribers.borrow_mut().publish(user);
        for listener in listeners {
            listener.emit(event.clone());
        }
    }

    async fn authenticate(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let raw = self
            .post(
                method,
                &CredentialsBody {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let account: AccountResponse =
            serde_json::from_str(&raw).map_err(|err| AuthError::Decode(err.to_string()))?;
        Ok(User {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            id_token: account.id_token,
        })
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let mut user = self.authenticate("signUp", email, password).await?;
        user.display_name = Some(name.to_string());
        info!(uid = %user.uid, "account created");
        set_user_cookie(Some(&user.uid));
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .authenticate("signInWithPassword", email, password)
            .await?;
        info!(uid = %user.uid, "signed in");
        set_user_cookie(Some(&user.uid));
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.post(
            "sendOobCode",
            &PasswordResetBody {
                request_type: "PASSWORD_RESET",
                email,
            },
        )
        .await?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.subscribers.borrow().current().map(|user| user.uid.clone());
        set_user_cookie(None);
        self.publish(None);
        info!(uid = ?previous, "signed out");
        Ok(())
    }

    fn subscribe(&self, callback: Callback<AuthEvent>) -> SubscriptionId {
        let (id, initial) = self.subscribers.borrow_mut().subscribe(callback.clone());
        callback.emit(initial);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().unsubscribe(id);
    }
}
