//! Traversal Engine - moves players through the story graph.
//!
//! Per user the engine is a two-state machine: not playing, or at a node.
//!
//! - `start` puts the user at `start` (after the quota gate agrees)
//! - `choose` with an offered letter moves to the resolved target
//! - reaching an ending drops the session and records a completion
//! - a letter the node does not offer re-renders the node and moves nothing
//!
//! No failure ever changes a session; the last valid position is kept.

mod branch;

pub use branch::*;

use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tracing::field;

use story_graph::{ChoiceKey, NodeKey, StoryGraph, StoryNode};

use crate::collaborators::{DirectoryMediaResolver, MediaResolver, NoMedia, QuotaGate, Unlimited};
use crate::config::{AdventureConfig, Messages};
use crate::error::{AdventureError, SetupError};
use crate::format::{FormatOptions, Response, ResponseFormatter};
use crate::session::{PlaythroughId, Session, SessionChange, SessionStore, UserId};

/// Where a choice led, decided while the user's session is locked.
enum Step<'g> {
    Rejected {
        node: &'g StoryNode,
        choice: ChoiceKey,
    },
    Moved {
        node: &'g StoryNode,
    },
    Ended {
        node: &'g StoryNode,
        playthrough: PlaythroughId,
        steps: u32,
    },
}

type Decision<'g> = (SessionChange, Result<Step<'g>, AdventureError>);

fn stay<'g>(error: AdventureError) -> Decision<'g> {
    (SessionChange::Stay, Err(error))
}

/// The adventure engine.
///
/// Owns the sessions; reads the story and its collaborators, which are
/// injected at construction.
pub struct AdventureEngine<M = NoMedia, Q = Unlimited> {
    graph: Arc<StoryGraph>,
    sessions: SessionStore,
    media: M,
    quota: Q,
    formatter: ResponseFormatter,
}

impl<M: MediaResolver, Q: QuotaGate> AdventureEngine<M, Q> {
    /// Create an engine over a story with the given collaborators.
    pub fn new(graph: Arc<StoryGraph>, media: M, quota: Q) -> Self {
        Self {
            graph,
            sessions: SessionStore::new(),
            media,
            quota,
            formatter: ResponseFormatter::default(),
        }
    }

    /// Replace the presentation settings.
    pub fn with_format(mut self, options: FormatOptions) -> Self {
        self.formatter = ResponseFormatter::new(options);
        self
    }

    /// Begin (or restart) a playthrough at the `start` node.
    #[tracing::instrument(skip_all, fields(user = tracing::field::Empty))]
    pub fn start(&self, user: impl Into<UserId>) -> Result<Response, AdventureError> {
        let user = user.into();
        tracing::Span::current().record("user", field::display(&user));

        match self.quota.may_start(&user) {
            Ok(true) => {}
            Ok(false) => return Err(AdventureError::DailyLimitReached),
            Err(error) => {
                tracing::warn!(error = %error, "Quota check failed, allowing start");
            }
        }

        let Some(node) = self.graph.start() else {
            tracing::error!("Story has no start node");
            return Err(AdventureError::NoStartNode);
        };

        let playthrough = self.sessions.begin(&user, NodeKey::start());
        tracing::info!(playthrough = %playthrough, "Adventure started");

        Ok(self.formatter.format(node, &self.media))
    }

    /// Apply a player's choice using the thread-local random generator.
    pub fn choose(&self, user: impl Into<UserId>, input: &str) -> Result<Response, AdventureError> {
        self.choose_with_rng(user, input, &mut rand::thread_rng())
    }

    /// Apply a player's choice, drawing weighted branches from `rng`.
    #[tracing::instrument(skip_all, fields(user = tracing::field::Empty, input = input))]
    pub fn choose_with_rng<R: Rng>(
        &self,
        user: impl Into<UserId>,
        input: &str,
        rng: &mut R,
    ) -> Result<Response, AdventureError> {
        let user = user.into();
        tracing::Span::current().record("user", field::display(&user));

        let choice = ChoiceKey::parse_input(input);
        let step = self
            .sessions
            .step(&user, |session| self.decide(session, choice, input, rng))
            .ok_or(AdventureError::NotPlaying)??;

        let response = match step {
            Step::Rejected { node, choice } => {
                tracing::warn!(choice = %choice, "Choice not offered here");
                self.formatter.format_rejected(node, choice, &self.media)
            }
            Step::Moved { node } => self.formatter.format(node, &self.media),
            Step::Ended {
                node,
                playthrough,
                steps,
            } => {
                tracing::info!(playthrough = %playthrough, steps, "Ending reached");
                if let Err(error) = self.quota.record_completion(&user) {
                    tracing::warn!(error = %error, "Failed to record completion");
                }
                self.formatter.format_ending(node, &self.media)
            }
        };

        Ok(response)
    }

    /// Decide the outcome of a choice for a locked session.
    fn decide<'g, R: Rng>(
        &'g self,
        session: &Session,
        choice: Option<ChoiceKey>,
        input: &str,
        rng: &mut R,
    ) -> Decision<'g> {
        let Some(choice) = choice else {
            return stay(AdventureError::InvalidChoiceFormat {
                input: input.to_string(),
            });
        };

        let from = &session.node;
        let Some(current) = self.graph.get(from.as_str()) else {
            tracing::error!(node = %from, "Session points at a node missing from the story");
            return stay(AdventureError::BrokenLink {
                from: from.clone(),
                choice,
                target: Some(from.clone()),
            });
        };

        let Some(option) = current.option(choice) else {
            return (SessionChange::Stay, Ok(Step::Rejected { node: current, choice }));
        };

        let resolution = resolve_next(&option.next, rng);
        match resolution {
            Resolution::Drawn { target, roll } => {
                tracing::debug!(node = %from, choice = %choice, roll, drawn = %target, "Weighted draw");
            }
            Resolution::Fallback { target, roll } => {
                tracing::warn!(
                    node = %from,
                    choice = %choice,
                    roll,
                    fallback = %target,
                    "Weighted branch missed, falling back to first target"
                );
            }
            Resolution::Target(_) | Resolution::NoTarget => {}
        }

        let Some(target) = resolution.target() else {
            tracing::error!(node = %from, choice = %choice, "Weighted branch table is empty");
            return stay(AdventureError::BrokenLink {
                from: from.clone(),
                choice,
                target: None,
            });
        };

        let Some(node) = self.graph.get(target.as_str()) else {
            tracing::error!(
                node = %from,
                choice = %choice,
                target = %target,
                "Option leads to a missing node"
            );
            return stay(AdventureError::BrokenLink {
                from: from.clone(),
                choice,
                target: Some(target.clone()),
            });
        };

        tracing::debug!(from = %from, choice = %choice, to = %target, "Transition");

        if node.is_end {
            let ended = Step::Ended {
                node,
                playthrough: session.playthrough,
                steps: session.steps + 1,
            };
            (SessionChange::End, Ok(ended))
        } else {
            (SessionChange::MoveTo(target.clone()), Ok(Step::Moved { node }))
        }
    }

    /// Check if a user has an active playthrough.
    pub fn is_playing(&self, user: impl Into<UserId>) -> bool {
        self.sessions.contains(&user.into())
    }

    /// Current node of a user, or `None` if they are not playing.
    pub fn current_node(&self, user: impl Into<UserId>) -> Option<NodeKey> {
        self.sessions.get(&user.into())
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn quota(&self) -> &Q {
        &self.quota
    }

    /// Fixed strings used in replies and error guidance.
    pub fn messages(&self) -> &Messages {
        self.formatter.messages()
    }
}

impl<Q: QuotaGate> AdventureEngine<DirectoryMediaResolver, Q> {
    /// Compose an engine from configuration.
    ///
    /// Loads the story, resolves images from the configured directory and
    /// refuses to build an engine for a story without a `start` node.
    pub fn from_config(
        config: &AdventureConfig,
        resource_root: &Path,
        quota: Q,
    ) -> Result<Self, SetupError> {
        let (story_path, image_dir) = config.resolve_paths(resource_root);

        let graph = StoryGraph::load(&story_path)?;
        if !graph.has_start() {
            tracing::error!(path = %story_path.display(), "Story has no start node");
            return Err(SetupError::NoStartNode { path: story_path });
        }

        let engine = Self::new(Arc::new(graph), DirectoryMediaResolver::new(image_dir), quota)
            .with_format(config.clone().into());
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DailyQuota, QuotaError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU32, Ordering};
    use story_graph::Next;

    struct BrokenQuota {
        completions: AtomicU32,
    }

    impl QuotaGate for BrokenQuota {
        fn may_start(&self, _user: &UserId) -> Result<bool, QuotaError> {
            Err(QuotaError::Unavailable("offline".into()))
        }

        fn record_completion(&self, _user: &UserId) -> Result<(), QuotaError> {
            self.completions.fetch_add(1, Ordering::SeqCst);
            Err(QuotaError::Unavailable("offline".into()))
        }
    }

    fn key(c: char) -> ChoiceKey {
        ChoiceKey::try_from(c).unwrap()
    }

    fn short_story() -> Arc<StoryGraph> {
        Arc::new(
            [
                (
                    "start",
                    StoryNode::new("Hello").with_option(key('A'), "leave", Next::fixed("end")),
                ),
                ("end", StoryNode::new("Bye").ending()),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_quota_refusal_leaves_no_session() {
        let quota = DailyQuota::new(1);
        quota.record_completion(&UserId::from("u")).unwrap();
        let engine = AdventureEngine::new(short_story(), NoMedia, quota);

        assert_eq!(engine.start("u"), Err(AdventureError::DailyLimitReached));
        assert!(!engine.is_playing("u"));
    }

    #[test]
    fn test_completion_is_recorded_once() {
        let engine = AdventureEngine::new(short_story(), NoMedia, DailyQuota::new(5));

        engine.start("u").unwrap();
        engine.choose("u", "A").unwrap();

        assert_eq!(engine.quota().count(&UserId::from("u")), 1);
        assert_eq!(engine.choose("u", "A"), Err(AdventureError::NotPlaying));
        assert_eq!(engine.quota().count(&UserId::from("u")), 1);
    }

    #[test]
    fn test_failing_quota_backend_does_not_block_play() {
        let quota = BrokenQuota {
            completions: AtomicU32::new(0),
        };
        let engine = AdventureEngine::new(short_story(), NoMedia, quota);

        engine.start("u").unwrap();
        let response = engine.choose("u", "a").unwrap();

        assert!(response.is_end);
        assert!(!engine.is_playing("u"));
        assert_eq!(engine.quota().completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_restart_mid_playthrough() {
        let graph: StoryGraph = [
            (
                "start",
                StoryNode::new("Hello").with_option(key('A'), "on", Next::fixed("middle")),
            ),
            (
                "middle",
                StoryNode::new("Halfway").with_option(key('A'), "on", Next::fixed("start")),
            ),
        ]
        .into_iter()
        .collect();
        let engine = AdventureEngine::new(Arc::new(graph), NoMedia, Unlimited);

        engine.start(7u64).unwrap();
        engine.choose(7u64, "A").unwrap();
        let before = engine.sessions().session(&UserId::from(7u64)).unwrap();
        assert_eq!(before.node, NodeKey::new("middle"));

        engine.start("7").unwrap();
        let after = engine.sessions().session(&UserId::from(7u64)).unwrap();
        assert_eq!(after.node, NodeKey::start());
        assert_ne!(after.playthrough, before.playthrough);
    }

    #[test]
    fn test_session_on_vanished_node_is_broken_link() {
        let engine = AdventureEngine::new(short_story(), NoMedia, Unlimited);
        let user = UserId::from("u");
        engine.sessions().set(&user, NodeKey::new("ghost"));

        let err = engine.choose(&user, "A").unwrap_err();
        assert!(matches!(err, AdventureError::BrokenLink { .. }));
        assert_eq!(engine.current_node(&user), Some(NodeKey::new("ghost")));
    }

    #[test]
    fn test_custom_format_applies() {
        let engine = AdventureEngine::new(short_story(), NoMedia, Unlimited).with_format(
            FormatOptions {
                choose_command: "#pick".to_string(),
                ..FormatOptions::default()
            },
        );

        let response = engine.start("u").unwrap();
        assert_eq!(response.choices[0][0].action, "#pick A");
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let graph: StoryGraph = [
            (
                "start",
                StoryNode::new("Coin").with_option(
                    key('A'),
                    "flip",
                    Next::weighted([("heads", 0.5), ("tails", 0.5)]),
                ),
            ),
            ("heads", StoryNode::new("Heads").ending()),
            ("tails", StoryNode::new("Tails").ending()),
        ]
        .into_iter()
        .collect();
        let engine = AdventureEngine::new(Arc::new(graph), NoMedia, Unlimited);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| {
                    engine.start("u").unwrap();
                    engine.choose_with_rng("u", "A", &mut rng).unwrap().text
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(run(11), run(11));
    }
}
