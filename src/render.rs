use minijinja::{Environment, Value};
use serde::Serialize;

use crate::analysis::{AnalysisResult, InteractionRecord, Severity};
use crate::query::RequestLifecycle;
use crate::session::SessionState;

/// Visual emphasis of a card. Ordering and filtering never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Minor,
    Moderate,
    Major,
    Contraindicated,
    /// Neutral style for any severity outside the known four.
    Unknown,
}

impl SeverityTier {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Minor => "tier-minor",
            Self::Moderate => "tier-moderate",
            Self::Major => "tier-major",
            Self::Contraindicated => "tier-contraindicated",
            Self::Unknown => "tier-unknown",
        }
    }
}

impl From<&Severity> for SeverityTier {
    fn from(severity: &Severity) -> Self {
        match severity {
            Severity::Minor => Self::Minor,
            Severity::Moderate => Self::Moderate,
            Severity::Major => Self::Major,
            Severity::Contraindicated => Self::Contraindicated,
            Severity::Unrecognized(_) => Self::Unknown,
        }
    }
}

pub fn count_badge(result: &AnalysisResult) -> String {
    format!("{} Found", result.count())
}

#[derive(Debug, Serialize)]
struct CardView<'a> {
    severity: &'a str,
    tier_class: &'static str,
    drugs: &'a [String],
    mechanism: &'a str,
    clinical_effect: &'a str,
    recommendation: &'a str,
}

impl<'a> From<&'a InteractionRecord> for CardView<'a> {
    fn from(record: &'a InteractionRecord) -> Self {
        Self {
            severity: record.severity.as_str(),
            tier_class: SeverityTier::from(&record.severity).css_class(),
            drugs: &record.drugs,
            mechanism: &record.mechanism,
            clinical_effect: &record.clinical_effect,
            recommendation: &record.recommendation,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    count_badge: String,
    summary: &'a str,
    cards: Vec<CardView<'a>>,
}

impl<'a> From<&'a AnalysisResult> for ResultView<'a> {
    fn from(result: &'a AnalysisResult) -> Self {
        Self {
            count_badge: count_badge(result),
            summary: &result.summary,
            cards: result.interactions.iter().map(CardView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultContext<'a> {
    result: ResultView<'a>,
}

#[derive(Debug, Serialize)]
struct MainContext<'a> {
    agent_name: &'a str,
    input: &'a str,
    can_submit: bool,
    loading: bool,
    error: Option<&'a str>,
    /// Pre-rendered `results.html`, marked safe.
    results_html: Option<Value>,
}

/// Everything the main page shows, borrowed from the screen.
#[derive(Debug, Clone, Copy)]
pub struct MainView<'a> {
    pub session: &'a SessionState,
    pub input: &'a str,
    pub can_submit: bool,
    pub lifecycle: &'a RequestLifecycle,
}

/// HTML templates for the screen. Output is auto-escaped.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("onboarding.html", include_str!("../templates/onboarding.html"))?;
        env.add_template("main.html", include_str!("../templates/main.html"))?;
        env.add_template("results.html", include_str!("../templates/results.html"))?;
        Ok(Self { env })
    }

    pub fn onboarding(&self) -> Result<String, minijinja::Error> {
        self.env
            .get_template("onboarding.html")?
            .render(minijinja::context! {})
    }

    pub fn main(&self, view: MainView<'_>) -> Result<String, minijinja::Error> {
        let (error, results_html) = match view.lifecycle {
            RequestLifecycle::Failed(message) => (Some(message.as_str()), None),
            RequestLifecycle::Success(result) => {
                (None, Some(Value::from_safe_string(self.result(result)?)))
            }
            RequestLifecycle::Idle | RequestLifecycle::Loading => (None, None),
        };

        self.env.get_template("main.html")?.render(MainContext {
            agent_name: &view.session.agent_name,
            input: view.input,
            can_submit: view.can_submit,
            loading: view.lifecycle.is_loading(),
            error,
            results_html,
        })
    }

    /// The card list on its own, also embedded by [`Renderer::main`].
    pub fn result(&self, result: &AnalysisResult) -> Result<String, minijinja::Error> {
        self.env.get_template("results.html")?.render(ResultContext {
            result: ResultView::from(result),
        })
    }
}
