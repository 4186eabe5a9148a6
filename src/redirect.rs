//! The "open app, else store, else in-page preview" flow.
//!
//! The browser runs this as inline script (see `render::script`). This module
//! is the reference model of that script: the same transitions, driven by an
//! injectable [`Clock`] and emitting [`Command`]s instead of touching the DOM.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::models::EntityKind;
use crate::platform::{Classification, Platform};

/// How long to wait for the page to be backgrounded after navigating to the
/// deep link before assuming the app is not installed.
pub const APP_OPEN_TIMEOUT: Duration = Duration::from_millis(2000);

pub const DESKTOP_NOTICE: &str =
    "Please open this link on an iOS or Android device to use the calsocial app.";

/// Links baked into a share page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub kind: EntityKind,
    pub id: String,
    pub deep_link: String,
    pub universal_link: String,
    pub app_store_url: String,
    pub play_store_url: String,
}

impl ShareLinks {
    pub fn new(config: &Config, kind: EntityKind, id: &str) -> Self {
        let segment = kind.profile().segment;
        let encoded = urlencoding::encode(id);
        ShareLinks {
            kind,
            id: id.to_string(),
            deep_link: format!("{}://{}/{}", config.app_scheme, segment, encoded),
            universal_link: format!("{}/{}/{}", config.public_base_url, segment, encoded),
            app_store_url: config.app_store_url.clone(),
            play_store_url: config.play_store_url.clone(),
        }
    }

    /// Store listing for `platform`. Desktop gets the App Store.
    pub fn store_url(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.play_store_url,
            Platform::Ios | Platform::Desktop => &self.app_store_url,
        }
    }
}

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    OpenedApp,
    ShowedStoreLink,
    ShowedError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Detecting,
    AttemptingOpen { deadline: Duration },
    Terminal(Outcome),
}

/// Side effects the page must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowPreview,
    Navigate(String),
    OpenInNewTab(String),
    StartTimer(Duration),
    CancelTimer,
    ShowStoreCta,
    ShowError(String),
}

pub struct OpenAppFlow<C: Clock> {
    links: ShareLinks,
    clock: C,
    env: Option<Classification>,
    state: FlowState,
}

impl<C: Clock> OpenAppFlow<C> {
    pub fn new(links: ShareLinks, clock: C) -> Self {
        OpenAppFlow {
            links,
            clock,
            env: None,
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Page loaded: classify the visitor and decide whether to try the app.
    pub fn start(&mut self, env: Classification) -> Vec<Command> {
        if self.state != FlowState::Idle {
            return Vec::new();
        }
        self.state = FlowState::Detecting;
        self.env = Some(env);

        if self.links.id.is_empty() {
            let message = format!("Error: {} ID is missing", self.links.kind.profile().noun);
            self.state = FlowState::Terminal(Outcome::ShowedError(message.clone()));
            return vec![Command::ShowError(message)];
        }

        if env.platform == Platform::Desktop {
            self.state = FlowState::Terminal(Outcome::ShowedError(DESKTOP_NOTICE.to_string()));
            return vec![
                Command::ShowPreview,
                Command::ShowError(DESKTOP_NOTICE.to_string()),
                Command::ShowStoreCta,
            ];
        }

        if env.in_app_browser {
            // Custom schemes are unreliable inside webviews.
            self.state = FlowState::Terminal(Outcome::ShowedStoreLink);
            return vec![Command::ShowPreview, Command::ShowStoreCta];
        }

        let mut commands = vec![Command::ShowPreview];
        commands.extend(self.attempt_open());
        commands
    }

    /// The page was hidden, blurred or unloaded.
    pub fn page_hidden(&mut self) -> Vec<Command> {
        match self.state {
            FlowState::AttemptingOpen { deadline } if self.clock.now() < deadline => {
                self.state = FlowState::Terminal(Outcome::OpenedApp);
                vec![Command::CancelTimer]
            }
            FlowState::AttemptingOpen { .. } => self.timer_fired(),
            _ => Vec::new(),
        }
    }

    /// The detection timer fired. Early or stale firings are ignored.
    pub fn timer_fired(&mut self) -> Vec<Command> {
        match self.state {
            FlowState::AttemptingOpen { deadline } if self.clock.now() >= deadline => {
                self.state = FlowState::Terminal(Outcome::ShowedStoreLink);
                vec![Command::ShowStoreCta]
            }
            _ => Vec::new(),
        }
    }

    /// The visitor pressed "Open in calsocial".
    pub fn open_clicked(&mut self) -> Vec<Command> {
        let Some(env) = self.env else {
            return Vec::new();
        };

        match self.state.clone() {
            FlowState::Terminal(Outcome::OpenedApp) => {
                vec![Command::Navigate(self.links.deep_link.clone())]
            }
            FlowState::Terminal(Outcome::ShowedStoreLink) if env.in_app_browser => {
                let target = if env.platform == Platform::Ios {
                    &self.links.universal_link
                } else {
                    &self.links.deep_link
                };
                vec![Command::Navigate(target.clone())]
            }
            FlowState::Terminal(Outcome::ShowedStoreLink) => self.attempt_open(),
            _ => Vec::new(),
        }
    }

    /// The visitor pressed "Download".
    pub fn store_clicked(&self) -> Vec<Command> {
        match self.env {
            Some(env) if env.platform == Platform::Desktop => {
                vec![Command::OpenInNewTab(self.links.store_url(env.platform).to_string())]
            }
            Some(env) => vec![Command::Navigate(
                self.links.store_url(env.platform).to_string(),
            )],
            None => Vec::new(),
        }
    }

    fn attempt_open(&mut self) -> Vec<Command> {
        self.state = FlowState::AttemptingOpen {
            deadline: self.clock.now() + APP_OPEN_TIMEOUT,
        };
        vec![
            Command::Navigate(self.links.deep_link.clone()),
            Command::StartTimer(APP_OPEN_TIMEOUT),
        ]
    }
}
