//! Chat-driven dashboard logic, independent of the DOM.
//!
//! The controller owns the dashboard state and talks to the finance API. The
//! view renders `state()` and forwards user actions; `on_change` fires after
//! every state mutation so the view can re-render.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use yew::Callback;

use crate::analysis;
use crate::api::{FinanceApi, UserStats};
use crate::breakdown::render_breakdown;
use crate::config::AppConfig;
use crate::format::Currency;
use crate::identity::{AuthEvent, User};
use crate::snapshot::{FinancialSnapshot, SnapshotView, Trend};

pub const LOGIN_REQUIRED: &str = "Please log in to use this feature.";
pub const MODE_REQUIRED: &str =
    "Please select an option first (Add Transaction, Financial Analysis, or Expense Breakdown)";
pub const SIGNED_OUT_NOTICE: &str = "Please log in to use the system.";
pub const DEFAULT_CAPTION: &str = "Your personal finance assistant";
pub const TRANSACTION_ADDED_CAPTION: &str = "Transaction successfully added!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    AddTransaction,
    FinancialAnalysis,
    ExpenseBreakdown,
}

impl Mode {
    pub fn all() -> [Mode; 3] {
        [
            Mode::AddTransaction,
            Mode::FinancialAnalysis,
            Mode::ExpenseBreakdown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::AddTransaction => "add-transaction",
            Mode::FinancialAnalysis => "financial-analysis",
            Mode::ExpenseBreakdown => "expense-breakdown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::AddTransaction => "Add Transaction",
            Mode::FinancialAnalysis => "Financial Analysis",
            Mode::ExpenseBreakdown => "Expense Breakdown",
        }
    }

    /// Bot message shown when the mode is selected. Breakdown has none; it
    /// fetches its content straight away.
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            Mode::AddTransaction => Some(
                "Please describe your transaction (e.g. \"I spent $50 on groceries\" or \"I received $200 salary\")",
            ),
            Mode::FinancialAnalysis => Some(
                "Ask any question about your financial data (e.g. \"Where am I spending the most?\" or \"What's my current balance?\")",
            ),
            Mode::ExpenseBreakdown => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: u64,
    pub origin: Origin,
    pub text: String,
    /// Loading indicator attached to a user message awaiting its reply.
    pub pending: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardState {
    pub session: Option<User>,
    pub mode: Option<Mode>,
    pub messages: Vec<Message>,
    pub busy: bool,
    pub error: Option<String>,
    pub caption: String,
    pub snapshot: SnapshotView,
    pub stats: Option<UserStats>,
    previous_balance: f64,
    generation: u64,
    next_message_id: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            session: None,
            mode: None,
            messages: Vec::new(),
            busy: false,
            error: None,
            caption: DEFAULT_CAPTION.to_string(),
            snapshot: SnapshotView::default(),
            stats: None,
            previous_balance: 0.0,
            generation: 0,
            next_message_id: 0,
        }
    }
}

impl DashboardState {
    pub fn controls_enabled(&self) -> bool {
        self.session.is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.session.as_ref().map(|user| user.uid.clone())
    }

    fn push(&mut self, origin: Origin, text: String, pending: bool) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            origin,
            text,
            pending,
        });
        id
    }

    fn push_bot(&mut self, text: impl Into<String>) {
        self.push(Origin::Bot, text.into(), false);
    }

    fn settle(&mut self, message_id: u64) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.pending = false;
        }
    }

    /// Invalidates every in-flight response.
    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// An accepted submission, ready to be dispatched.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    text: String,
    user_id: String,
    mode: Mode,
    message_id: u64,
    generation: u64,
}

pub struct DashboardController {
    api: Rc<dyn FinanceApi>,
    config: Rc<AppConfig>,
    currency: Currency,
    today: Box<dyn Fn() -> NaiveDate>,
    state: RefCell<DashboardState>,
    on_change: Callback<()>,
}

impl DashboardController {
    pub fn new(api: Rc<dyn FinanceApi>, config: Rc<AppConfig>, on_change: Callback<()>) -> Self {
        Self {
            currency: Currency::new(&config.currency_code),
            api,
            config,
            today: Box::new(|| chrono::Local::now().date_naive()),
            state: RefCell::new(DashboardState::default()),
            on_change,
        }
    }

    /// Replaces the clock used to date the expense breakdown.
    #[cfg(test)]
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn state(&self) -> Ref<'_, DashboardState> {
        self.state.borrow()
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.on_change.emit(());
        result
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    pub async fn handle_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                let already_current = self
                    .state
                    .borrow()
                    .session
                    .as_ref()
                    .is_some_and(|current| current.uid == user.uid);
                if already_current {
                    return;
                }
                info!(uid = %user.uid, "session started");
                self.update(|state| {
                    state.bump_generation();
                    state.messages.clear();
                    state.session = Some(user);
                    state.error = None;
                });
                futures::join!(self.refresh_snapshot(), self.refresh_statistics());
            }
            AuthEvent::SignedOut => {
                info!("session ended");
                self.update(|state| {
                    let generation = state.bump_generation();
                    let next_message_id = state.next_message_id;
                    *state = DashboardState {
                        generation,
                        next_message_id,
                        ..DashboardState::default()
                    };
                });
            }
        }
    }

    pub async fn select_mode(&self, mode: Mode) {
        debug!(mode = mode.as_str(), "mode selected");
        let generation = self.update(|state| {
            state.mode = Some(mode);
            state.messages.clear();
            state.busy = false;
            state.error = None;
            if let Some(instruction) = mode.instruction() {
                state.push_bot(instruction);
            }
            state.bump_generation()
        });

        if mode == Mode::ExpenseBreakdown {
            self.load_breakdown(generation).await;
        }
    }

    async fn load_breakdown(&self, generation: u64) {
        let user_id = self.state.borrow().user_id();
        let Some(user_id) = user_id else {
            self.update(|state| state.push_bot(LOGIN_REQUIRED));
            return;
        };

        self.update(|state| state.busy = true);
        let result = self.api.transactions(&user_id).await;
        if !self.is_current(generation) {
            debug!("discarding stale expense breakdown");
            return;
        }

        let text = match result {
            Ok(listing) => render_breakdown(&listing.expenses, (self.today)(), &self.currency),
            Err(err) => {
                warn!(error = %err, "expense breakdown failed");
                format!(
                    "Error loading expense breakdown: {}",
                    err.detail_or("Failed to load expense data")
                )
            }
        };
        self.update(|state| {
            state.busy = false;
            state.push_bot(text);
        });
    }

    /// Validates `text` against the current state and, if accepted, records
    /// the user message. Returns `None` when nothing should be sent; the input
    /// field is cleared only for accepted submissions.
    pub fn prepare_submit(&self, text: &str) -> Option<Submission> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (user_id, mode) = {
            let state = self.state.borrow();
            (state.user_id(), state.mode)
        };
        let Some(user_id) = user_id else {
            self.update(|state| state.push_bot(LOGIN_REQUIRED));
            return None;
        };
        let Some(mode) = mode else {
            self.update(|state| state.push_bot(MODE_REQUIRED));
            return None;
        };

        Some(self.update(|state| {
            let message_id = state.push(Origin::User, text.to_string(), true);
            state.busy = true;
            state.error = None;
            Submission {
                text: text.to_string(),
                user_id,
                mode,
                message_id,
                generation: state.generation,
            }
        }))
    }

    pub async fn dispatch(&self, submission: Submission) {
        let outcome = match submission.mode {
            Mode::AddTransaction => self
                .api
                .add_transaction(&submission.text, &submission.user_id)
                .await
                .map(|added| {
                    Some(format!(
                        "Transaction added: {} ({})",
                        added.category,
                        self.currency.format(added.amount)
                    ))
                })
                .map_err(|err| {
                    format!(
                        "Error adding transaction: {}",
                        err.detail_or("Failed to add transaction")
                    )
                }),
            Mode::FinancialAnalysis => self
                .api
                .analyze(&submission.text, &submission.user_id)
                .await
                .map(|answer| Some(analysis::format_answer(&answer)))
                .map_err(|err| {
                    format!(
                        "Error analyzing data: {}",
                        err.detail_or("Failed to analyze data")
                    )
                }),
            // the breakdown is produced when the mode is selected
            Mode::ExpenseBreakdown => Ok(None),
        };

        let added = matches!(
            (&outcome, submission.mode),
            (Ok(Some(_)), Mode::AddTransaction)
        );
        if !self.is_current(submission.generation) {
            debug!(mode = submission.mode.as_str(), "discarding stale response");
            // the transaction is stored either way, so the totals still move
            if added {
                futures::join!(self.refresh_snapshot(), self.refresh_statistics());
            }
            return;
        }

        self.update(|state| {
            state.busy = false;
            state.settle(submission.message_id);
            match outcome {
                Ok(Some(reply)) => state.push_bot(reply),
                Ok(None) => {}
                Err(message) => {
                    warn!(%message, "request failed");
                    state.error = Some(message);
                }
            }
            if added {
                state.caption = TRANSACTION_ADDED_CAPTION.to_string();
            }
        });

        if added {
            futures::join!(self.refresh_snapshot(), self.refresh_statistics());
        }
    }

    /// `prepare_submit` and `dispatch` in one step.
    #[cfg(test)]
    pub async fn submit(&self, text: &str) -> bool {
        match self.prepare_submit(text) {
            Some(submission) => {
                self.dispatch(submission).await;
                true
            }
            None => false,
        }
    }

    pub async fn refresh_snapshot(&self) {
        let user_id = self.state.borrow().user_id();
        let Some(user_id) = user_id else {
            return;
        };

        let result = self
            .api
            .transactions(&user_id)
            .await
            .and_then(|listing| FinancialSnapshot::from_listing(&listing, self.config.balance_source));
        if self.state.borrow().user_id().as_deref() != Some(user_id.as_str()) {
            debug!("discarding snapshot for a previous session");
            return;
        }

        let show_trend = self.config.show_balance_trend;
        self.update(|state| match result {
            Ok(snapshot) => {
                let trend = if show_trend {
                    Trend::between(state.previous_balance, snapshot.balance)
                } else {
                    None
                };
                state.previous_balance = snapshot.balance;
                state.snapshot = SnapshotView::Ready { snapshot, trend };
            }
            Err(err) => {
                warn!(error = %err, "snapshot refresh failed");
                state.snapshot = SnapshotView::Failed;
            }
        });
    }

    pub async fn refresh_statistics(&self) {
        let user_id = self.state.borrow().user_id();
        let Some(user_id) = user_id else {
            return;
        };

        let result = self.api.user_stats(&user_id).await;
        if self.state.borrow().user_id().as_deref() != Some(user_id.as_str()) {
            return;
        }
        match result {
            Ok(stats) => self.update(|state| state.stats = Some(stats)),
            Err(err) => warn!(error = %err, "statistics refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AddedTransaction, TransactionListing};
    use crate::config::BalanceSource;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeApi {
        calls: RefCell<Vec<String>>,
        added: RefCell<Option<Result<AddedTransaction, ApiError>>>,
        answer: RefCell<Option<Result<String, ApiError>>>,
        listings: RefCell<Vec<TransactionListing>>,
        listing_error: Cell<bool>,
        gates: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    }

    impl FakeApi {
        fn with_listing(listing: TransactionListing) -> Self {
            let api = Self::default();
            api.listings.borrow_mut().push(listing);
            api
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// Holds the next `operation` call until the returned sender fires.
        fn hold(&self, operation: &'static str) -> oneshot::Sender<()> {
            let (release, gate) = oneshot::channel();
            self.gates.borrow_mut().insert(operation, gate);
            release
        }

        async fn pass(&self, operation: &'static str) {
            let gate = self.gates.borrow_mut().remove(operation);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
        }
    }

    #[async_trait(?Send)]
    impl FinanceApi for FakeApi {
        async fn add_transaction(
            &self,
            text: &str,
            user_id: &str,
        ) -> Result<AddedTransaction, ApiError> {
            self.calls
                .borrow_mut()
                .push(format!("add:{}:{}", user_id, text));
            self.pass("add").await;
            self.added
                .borrow_mut()
                .take()
                .unwrap_or(Err(ApiError::Network("no response".into())))
        }

        async fn analyze(&self, query: &str, user_id: &str) -> Result<String, ApiError> {
            self.calls
                .borrow_mut()
                .push(format!("analyze:{}:{}", user_id, query));
            self.answer
                .borrow_mut()
                .take()
                .unwrap_or(Err(ApiError::Network("no response".into())))
        }

        async fn transactions(&self, user_id: &str) -> Result<TransactionListing, ApiError> {
            self.calls.borrow_mut().push(format!("transactions:{}", user_id));
            self.pass("transactions").await;
            if self.listing_error.get() {
                return Err(ApiError::Http {
                    status: 500,
                    detail: None,
                });
            }
            let mut listings = self.listings.borrow_mut();
            if listings.len() > 1 {
                Ok(listings.remove(0))
            } else {
                Ok(listings.first().cloned().unwrap_or_default())
            }
        }

        async fn user_stats(&self, user_id: &str) -> Result<UserStats, ApiError> {
            self.calls.borrow_mut().push(format!("stats:{}", user_id));
            self.pass("stats").await;
            Ok(UserStats {
                balance: 130.0,
                transaction_count: 3,
            })
        }
    }

    fn sample_listing() -> TransactionListing {
        TransactionListing {
            expenses: [
                ("Groceries".to_string(), 50.0),
                ("Transport".to_string(), 20.0),
            ]
            .into_iter()
            .collect(),
            deposits: vec![("Salary".to_string(), 200.0)],
            balance: Some(500.0),
        }
    }

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            email: "sam@example.com".to_string(),
            display_name: None,
            id_token: String::new(),
        }
    }

    fn controller_with(api: Rc<FakeApi>, config: AppConfig) -> (DashboardController, Rc<Cell<u32>>) {
        let renders = Rc::new(Cell::new(0));
        let counter = renders.clone();
        let controller = DashboardController::new(
            api,
            Rc::new(config),
            Callback::from(move |_| counter.set(counter.get() + 1)),
        )
        .with_today(|| NaiveDate::from_ymd_opt(2026, 10, 5).unwrap());
        (controller, renders)
    }

    fn controller(api: Rc<FakeApi>) -> DashboardController {
        let config = AppConfig {
            currency_code: "USD".to_string(),
            ..AppConfig::default()
        };
        controller_with(api, config).0
    }

    async fn signed_in(api: Rc<FakeApi>) -> DashboardController {
        let controller = controller(api.clone());
        controller.handle_auth_event(AuthEvent::SignedIn(user())).await;
        api.calls.borrow_mut().clear();
        controller
    }

    fn bot_texts(controller: &DashboardController) -> Vec<String> {
        controller
            .state()
            .messages
            .iter()
            .filter(|m| m.origin == Origin::Bot)
            .map(|m| m.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn sign_in_loads_snapshot_and_statistics() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let (controller, renders) = controller_with(api.clone(), AppConfig::default());

        controller.handle_auth_event(AuthEvent::SignedIn(user())).await;

        let state = controller.state();
        assert!(state.controls_enabled());
        assert_eq!(
            state.snapshot,
            SnapshotView::Ready {
                snapshot: FinancialSnapshot {
                    balance: 130.0,
                    total_deposits: 200.0,
                    total_expenses: 70.0,
                },
                trend: Some(Trend::Up),
            }
        );
        assert_eq!(state.stats.as_ref().map(|s| s.transaction_count), Some(3));
        assert!(renders.get() > 0);
        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["stats:u1", "transactions:u1"]);
    }

    #[tokio::test]
    async fn server_balance_source_uses_server_field() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let config = AppConfig {
            balance_source: BalanceSource::Server,
            show_balance_trend: false,
            ..AppConfig::default()
        };
        let (controller, _) = controller_with(api, config);

        controller.handle_auth_event(AuthEvent::SignedIn(user())).await;

        match &controller.state().snapshot {
            SnapshotView::Ready { snapshot, trend } => {
                assert_eq!(snapshot.balance, 500.0);
                assert_eq!(*trend, None);
            }
            other => panic!("unexpected snapshot {:?}", other),
        };
    }

    #[tokio::test]
    async fn failed_snapshot_is_marked() {
        let api = Rc::new(FakeApi::default());
        api.listing_error.set(true);
        let controller = controller(api);

        controller.handle_auth_event(AuthEvent::SignedIn(user())).await;

        assert_eq!(controller.state().snapshot, SnapshotView::Failed);
    }

    #[tokio::test]
    async fn trend_tracks_previous_balance() {
        let api = Rc::new(FakeApi::default());
        let mut poorer = sample_listing();
        poorer.expenses.insert("Rent".to_string(), 100.0);
        api.listings.borrow_mut().extend([sample_listing(), poorer.clone(), poorer]);
        let controller = controller(api);

        controller.handle_auth_event(AuthEvent::SignedIn(user())).await;
        controller.refresh_snapshot().await;
        let second = controller.state().snapshot.clone();
        controller.refresh_snapshot().await;
        let third = controller.state().snapshot.clone();

        assert!(matches!(second, SnapshotView::Ready { trend: Some(Trend::Down), .. }));
        assert!(matches!(third, SnapshotView::Ready { trend: None, .. }));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let api = Rc::new(FakeApi::default());
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::AddTransaction).await;
        let before = controller.state().messages.len();

        assert!(!controller.submit("   \n\t").await);

        assert_eq!(controller.state().messages.len(), before);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_submit_asks_for_login() {
        let api = Rc::new(FakeApi::default());
        let controller = controller(api.clone());
        controller.select_mode(Mode::AddTransaction).await;
        controller.state.borrow_mut().messages.clear();

        assert!(!controller.submit("I spent $5 on tea").await);

        assert_eq!(bot_texts(&controller), vec![LOGIN_REQUIRED]);
        assert_eq!(controller.state().messages.len(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn login_is_asked_for_before_mode() {
        let api = Rc::new(FakeApi::default());
        let controller = controller(api.clone());

        assert!(!controller.submit("hello").await);

        assert_eq!(bot_texts(&controller), vec![LOGIN_REQUIRED]);
        assert_eq!(controller.state().messages.len(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_without_mode_asks_for_selection() {
        let api = Rc::new(FakeApi::default());
        let controller = signed_in(api.clone()).await;

        assert!(!controller.submit("hello").await);

        assert_eq!(bot_texts(&controller), vec![MODE_REQUIRED]);
        assert_eq!(controller.state().messages.len(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn mode_switch_clears_messages_before_instruction() {
        let api = Rc::new(FakeApi::default());
        let controller = signed_in(api).await;
        controller.submit("hello").await;

        controller.select_mode(Mode::FinancialAnalysis).await;

        let state = controller.state();
        assert_eq!(state.mode, Some(Mode::FinancialAnalysis));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(
            state.messages[0].text,
            Mode::FinancialAnalysis.instruction().unwrap()
        );
    }

    #[tokio::test]
    async fn add_transaction_reports_and_refreshes() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        *api.added.borrow_mut() = Some(Ok(AddedTransaction {
            category: "Groceries".to_string(),
            amount: -50.0,
        }));
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::AddTransaction).await;

        assert!(controller.submit("  I spent $50 on groceries ").await);

        let state = controller.state();
        let user_message = &state.messages[1];
        assert_eq!(user_message.origin, Origin::User);
        assert_eq!(user_message.text, "I spent $50 on groceries");
        assert!(!user_message.pending);
        assert_eq!(
            state.messages.last().unwrap().text,
            "Transaction added: Groceries (-$50.00)"
        );
        assert_eq!(state.caption, TRANSACTION_ADDED_CAPTION);
        assert!(!state.busy);

        let calls = api.calls();
        assert_eq!(calls[0], "add:u1:I spent $50 on groceries");
        assert!(calls.contains(&"transactions:u1".to_string()));
        assert!(calls.contains(&"stats:u1".to_string()));
    }

    #[tokio::test]
    async fn add_transaction_failure_shows_server_detail() {
        let api = Rc::new(FakeApi::default());
        *api.added.borrow_mut() = Some(Err(ApiError::Http {
            status: 400,
            detail: Some("Amount is required".to_string()),
        }));
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::AddTransaction).await;

        controller.submit("lunch").await;

        let state = controller.state();
        assert_eq!(
            state.error.as_deref(),
            Some("Error adding transaction: Amount is required")
        );
        assert!(!state.busy);
        assert!(state.messages.iter().all(|m| !m.pending));
        assert_eq!(state.caption, DEFAULT_CAPTION);
        assert_eq!(api.calls(), vec!["add:u1:lunch"]);
    }

    #[tokio::test]
    async fn analysis_answer_is_reformatted() {
        let api = Rc::new(FakeApi::default());
        *api.answer.borrow_mut() =
            Some(Ok("Intro\n\n**Spending**\n*Point one\n*Point two".to_string()));
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::FinancialAnalysis).await;

        controller.submit("Where does my money go?").await;

        assert_eq!(
            bot_texts(&controller).last().unwrap(),
            "Intro\n\n**Spending**:\n\nPoint one.\nPoint two."
        );
        assert_eq!(api.calls(), vec!["analyze:u1:Where does my money go?"]);
    }

    #[tokio::test]
    async fn analysis_failure_uses_generic_text() {
        let api = Rc::new(FakeApi::default());
        *api.answer.borrow_mut() = Some(Err(ApiError::Http {
            status: 500,
            detail: None,
        }));
        let controller = signed_in(api).await;
        controller.select_mode(Mode::FinancialAnalysis).await;

        controller.submit("why?").await;

        assert_eq!(
            controller.state().error.as_deref(),
            Some("Error analyzing data: Failed to analyze data")
        );
    }

    #[tokio::test]
    async fn breakdown_is_fetched_on_selection() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let controller = signed_in(api.clone()).await;

        controller.select_mode(Mode::ExpenseBreakdown).await;

        let texts = bot_texts(&controller);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Expense Breakdown Till Monday, October 5, 2026:"));
        assert!(texts[0].ends_with("Total Expenses: $70.00"));
        assert!(!controller.state().busy);
        assert_eq!(api.calls(), vec!["transactions:u1"]);
    }

    #[tokio::test]
    async fn empty_breakdown_says_so() {
        let api = Rc::new(FakeApi::default());
        let controller = signed_in(api).await;

        controller.select_mode(Mode::ExpenseBreakdown).await;

        assert_eq!(
            bot_texts(&controller),
            vec![crate::breakdown::NO_EXPENSES_MESSAGE]
        );
    }

    #[tokio::test]
    async fn breakdown_failure_becomes_bot_message() {
        let api = Rc::new(FakeApi::default());
        api.listing_error.set(true);
        let controller = signed_in(api).await;

        controller.select_mode(Mode::ExpenseBreakdown).await;

        assert_eq!(
            bot_texts(&controller),
            vec!["Error loading expense breakdown: Failed to load expense data"]
        );
    }

    #[tokio::test]
    async fn submit_in_breakdown_mode_sends_nothing() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::ExpenseBreakdown).await;
        api.calls.borrow_mut().clear();

        assert!(controller.submit("more please").await);

        let state = controller.state();
        assert!(state.messages.iter().all(|m| !m.pending));
        assert!(!state.busy);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn response_after_mode_switch_is_discarded() {
        let api = Rc::new(FakeApi::default());
        *api.answer.borrow_mut() = Some(Ok("Late answer".to_string()));
        let controller = signed_in(api).await;
        controller.select_mode(Mode::FinancialAnalysis).await;

        let submission = controller.prepare_submit("question").unwrap();
        controller.select_mode(Mode::AddTransaction).await;
        controller.dispatch(submission).await;

        assert_eq!(
            bot_texts(&controller),
            vec![Mode::AddTransaction.instruction().unwrap()]
        );
        assert!(!controller.state().busy);
    }

    #[tokio::test]
    async fn add_committed_after_mode_switch_still_refreshes_totals() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        *api.added.borrow_mut() = Some(Ok(AddedTransaction {
            category: "Groceries".to_string(),
            amount: -50.0,
        }));
        let controller = signed_in(api.clone()).await;
        controller.select_mode(Mode::AddTransaction).await;
        controller.state.borrow_mut().snapshot = SnapshotView::default();
        controller.state.borrow_mut().stats = None;

        let release = api.hold("add");
        let submission = controller.prepare_submit("I spent $50 on groceries").unwrap();
        futures::join!(controller.dispatch(submission), async {
            controller.select_mode(Mode::FinancialAnalysis).await;
            release.send(()).unwrap();
        });

        assert_eq!(
            api.calls(),
            vec![
                "add:u1:I spent $50 on groceries".to_string(),
                "transactions:u1".to_string(),
                "stats:u1".to_string(),
            ]
        );
        let state = controller.state();
        assert_eq!(
            bot_texts(&controller),
            vec![Mode::FinancialAnalysis.instruction().unwrap()]
        );
        assert_eq!(state.caption, DEFAULT_CAPTION);
        match &state.snapshot {
            SnapshotView::Ready { snapshot, .. } => assert_eq!(snapshot.balance, 130.0),
            other => panic!("unexpected snapshot {:?}", other),
        };
        assert!(state.stats.is_some());
    }

    #[tokio::test]
    async fn breakdown_after_mode_switch_is_discarded() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let controller = signed_in(api.clone()).await;

        let release = api.hold("transactions");
        futures::join!(controller.select_mode(Mode::ExpenseBreakdown), async {
            controller.select_mode(Mode::FinancialAnalysis).await;
            release.send(()).unwrap();
        });

        assert_eq!(api.calls(), vec!["transactions:u1".to_string()]);
        assert_eq!(controller.state().mode, Some(Mode::FinancialAnalysis));
        assert_eq!(
            bot_texts(&controller),
            vec![Mode::FinancialAnalysis.instruction().unwrap()]
        );
        assert!(!controller.state().busy);
    }

    #[tokio::test]
    async fn refresh_for_a_previous_session_is_discarded() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let controller = controller(api.clone());

        let release_listing = api.hold("transactions");
        let release_stats = api.hold("stats");
        futures::join!(
            controller.handle_auth_event(AuthEvent::SignedIn(user())),
            async {
                controller.handle_auth_event(AuthEvent::SignedOut).await;
                release_listing.send(()).unwrap();
                release_stats.send(()).unwrap();
            }
        );

        assert_eq!(
            api.calls(),
            vec!["transactions:u1".to_string(), "stats:u1".to_string()]
        );
        let state = controller.state();
        assert!(!state.controls_enabled());
        assert_eq!(state.snapshot, SnapshotView::default());
        assert_eq!(state.stats, None);
    }

    #[tokio::test]
    async fn sign_out_resets_dashboard() {
        let api = Rc::new(FakeApi::with_listing(sample_listing()));
        let controller = signed_in(api).await;
        controller.select_mode(Mode::AddTransaction).await;
        controller.submit("coffee 3").await;

        controller.handle_auth_event(AuthEvent::SignedOut).await;

        let state = controller.state();
        assert!(state.messages.is_empty());
        assert!(!state.controls_enabled());
        assert_eq!(state.mode, None);
        assert_eq!(state.snapshot, SnapshotView::default());
        assert_eq!(state.stats, None);
        assert_eq!(state.error, None);
    }
}
