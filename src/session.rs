use std::path::Path;

use zeroize::Zeroize;

use crate::advisor::{compose_prompt, AdvisorGateway};
use crate::error::{PurseError, Result};
use crate::importer::load_dataset;
use crate::models::{ConversationTurn, Dataset};
use crate::reports::analyze;
use crate::settings::{password_digest, Settings};

pub const HELP_TEXT: &str = "Available commands: 'analyze', 'budget', 'invest', 'exit'";

pub const BUDGET_TEXT: &str = "\
General budgeting tips:
- Consider using the 50/30/20 rule (50% needs, 30% wants, 20% savings).
- Identify areas where you can potentially cut back or increase savings.";

pub const INVEST_TEXT: &str = "\
General investment tips:
- Diversify your investments across different asset classes to reduce risk.
- Consider investment opportunities such as stocks, bonds, ETFs, and mutual funds.
- Note: I can only provide general information on this topic. Always consult with a financial professional for personalized advice.";

pub const FAREWELL_TEXT: &str = "Exiting the chat.";

pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error processing your request.";

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    AuthenticatedNoData,
    AuthenticatedHasData,
}

/// Per-user state. Starts anonymous with no dataset and an empty history.
#[derive(Debug, Clone, Default)]
pub struct Session {
    authenticated: bool,
    dataset: Option<Dataset>,
    history: Vec<ConversationTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        match (self.authenticated, &self.dataset) {
            (false, _) => SessionState::Anonymous,
            (true, None) => SessionState::AuthenticatedNoData,
            (true, Some(_)) => SessionState::AuthenticatedHasData,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Analyze,
    Budget,
    Invest,
    Exit,
    /// Anything outside the fixed vocabulary goes to the advisor.
    Query,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "help" => Self::Help,
            "analyze" => Self::Analyze,
            "budget" => Self::Budget,
            "invest" => Self::Invest,
            "exit" => Self::Exit,
            _ => Self::Query,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password_sha256: String,
}

impl Credentials {
    pub fn new(username: &str, password_sha256: &str) -> Self {
        Self {
            username: username.to_string(),
            password_sha256: password_sha256.to_lowercase(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.username, &settings.password_sha256)
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password_digest(password) == self.password_sha256
    }
}

pub struct SessionController {
    session: Session,
    credentials: Credentials,
    gateway: Box<dyn AdvisorGateway>,
}

impl SessionController {
    pub fn new(credentials: Credentials, gateway: Box<dyn AdvisorGateway>) -> Self {
        Self {
            session: Session::new(),
            credentials,
            gateway,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Check the credential pair. The password buffer is wiped afterwards.
    pub fn login(&mut self, username: &str, mut password: String) -> Result<()> {
        let ok = self.credentials.verify(username, &password);
        password.zeroize();

        if self.session.authenticated {
            return Ok(());
        }
        if !ok {
            tracing::warn!(username, "login failed");
            return Err(PurseError::Auth);
        }
        self.session.authenticated = true;
        tracing::info!(username, state = ?self.state(), "logged in");
        Ok(())
    }

    /// Load a statement file; the current dataset is kept if loading fails.
    pub fn load_file(&mut self, file_path: &Path) -> Result<usize> {
        if !self.session.authenticated {
            return Err(PurseError::NotAuthenticated);
        }
        let dataset = load_dataset(file_path)?;
        let count = dataset.len();
        self.attach_dataset(dataset)?;
        Ok(count)
    }

    pub fn attach_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if !self.session.authenticated {
            return Err(PurseError::NotAuthenticated);
        }
        let replaced = self.session.dataset.replace(dataset).is_some();
        tracing::info!(replaced, state = ?self.state(), "dataset attached");
        Ok(())
    }

    /// Handle one line of user input and return the assistant's reply.
    ///
    /// Both the input and the reply are appended to the history. `exit` drops
    /// back to anonymous but keeps the dataset and history.
    pub fn handle(&mut self, input: &str) -> Result<String> {
        if !self.session.authenticated {
            return Err(PurseError::NotAuthenticated);
        }
        let Some(dataset) = self.session.dataset.as_ref() else {
            return Err(PurseError::NoDataset);
        };

        self.session.history.push(ConversationTurn::user(input));

        let command = Command::parse(input);
        tracing::debug!(?command, "dispatching");
        let response = match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Analyze => analyze(dataset).render(),
            Command::Budget => BUDGET_TEXT.to_string(),
            Command::Invest => INVEST_TEXT.to_string(),
            Command::Exit => {
                self.session.authenticated = false;
                tracing::info!("logged out");
                FAREWELL_TEXT.to_string()
            }
            Command::Query => ask_advisor(self.gateway.as_ref(), dataset, input),
        };

        self.session
            .history
            .push(ConversationTurn::assistant(response.clone()));
        Ok(response)
    }
}

fn ask_advisor(gateway: &dyn AdvisorGateway, dataset: &Dataset, question: &str) -> String {
    let answer = compose_prompt(dataset, question).and_then(|prompt| gateway.advise(&prompt));
    match answer {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "advisor request failed");
            APOLOGY_TEXT.to_string()
        }
    }
}
