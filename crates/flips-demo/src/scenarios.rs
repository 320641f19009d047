use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use flips_config::FlipsConfig;
use flips_core::{
    ChildSpec, FlipReport, Flips, ItemKey, Keyed, NodeId, SceneTree, StackDirection,
    TransitionProperty, TransitionSpec, VisualTree,
};

const ROW_HEIGHT: f32 = 24.0;
const ROW_GAP: f32 = 4.0;
const MOVE_MS: f32 = 250.0;
/// Clock step used while waiting for transitions to finish.
const FRAME_MS: f32 = 16.0;
const MAX_FRAMES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Card {
    pub id: u32,
}

impl Keyed for Card {
    fn key(&self) -> Option<ItemKey> {
        Some(ItemKey::from(self.id))
    }
}

/// A single list of cards in a [`SceneTree`].
pub struct Board {
    scene: SceneTree,
    list: NodeId,
    flips: Flips<Card, NodeId>,
    fade_ms: f32,
    fading: HashSet<ItemKey>,
}

impl Board {
    pub fn new(config: FlipsConfig, ids: &[u32]) -> Result<Self> {
        let mut scene = SceneTree::new(240.0, 480.0)?;
        scene.add_transition_rule(
            config.move_class(),
            TransitionSpec::property(TransitionProperty::Transform, MOVE_MS),
        );
        let fade_ms = config.in_out_duration as f32;

        let flips = Flips::new(config, cards(ids));
        let list = flips.mount(&mut scene).context("failed to create list element")?;
        let root = scene.root();
        scene.append_child(root, list)?;
        scene.set_stack(list, StackDirection::Column, ROW_GAP, 0.0)?;

        let mut board = Self {
            scene,
            list,
            flips,
            fade_ms,
            fading: HashSet::new(),
        };
        board.render()?;
        Ok(board)
    }

    pub fn set(&mut self, ids: &[u32]) -> Result<FlipReport> {
        self.flips.set_children(cards(ids));
        self.render()
    }

    fn render(&mut self) -> Result<FlipReport> {
        let list = self.list;
        let mut committed = Ok(());
        let report = self.flips.render(&mut self.scene, list, |scene, children| {
            let specs: Vec<ChildSpec> = children
                .keys()
                .map(|key| ChildSpec::new(key.clone(), 200.0, ROW_HEIGHT))
                .collect();
            committed = scene.commit_children(list, &specs).map(|_| ());
        });
        committed?;

        for record in &report.moved {
            tracing::info!(key = %record.key, dx = record.dx, dy = record.dy, "moving");
        }
        self.start_leaving();
        Ok(report)
    }

    /// Fade out every leaving card that is not fading yet.
    fn start_leaving(&mut self) {
        let leaving: Vec<ItemKey> = self.flips.leaving().into_iter().cloned().collect();
        self.fading.retain(|key| leaving.contains(key));
        for key in leaving {
            if self.fading.contains(&key) {
                continue;
            }
            let Some(node) = self.scene.element_for_key(self.list, &key) else {
                continue;
            };
            if self.scene.start_property_transition(node, "opacity", self.fade_ms) {
                tracing::debug!(key = %key, fade_ms = self.fade_ms, "fading out");
            } else {
                tracing::warn!(key = %key, "fade did not start; card stays until removed");
            }
            self.fading.insert(key);
        }
    }

    /// Run the clock until nothing is moving or fading.
    pub fn settle(&mut self) -> Result<()> {
        for _ in 0..MAX_FRAMES {
            let deliveries = self.scene.advance(FRAME_MS);
            let mut exited = Vec::new();
            for (current, event) in &deliveries {
                if self.flips.on_transition_end(&mut self.scene, *current, event) {
                    continue;
                }
                if event.target == *current && event.property_name == "opacity" {
                    exited.push(event.target);
                }
            }

            for node in exited {
                let handle = self
                    .scene
                    .marker(node)
                    .and_then(|key| self.flips.exit_handle(key))
                    .cloned();
                if let Some(handle) = handle {
                    if self.flips.exit_complete(&handle) {
                        self.render()?;
                    }
                }
            }

            if self.flips.animator().pending_listeners() == 0 && self.flips.leaving().is_empty() {
                return Ok(());
            }
        }
        bail!("transitions still running after {MAX_FRAMES} frames")
    }

    /// `key@y` for every card, in document order.
    pub fn describe(&mut self) -> Result<String> {
        let list_rect = self.scene.bounding_rect(self.list).context("list is detached")?;
        let mut parts = Vec::new();
        for (node, key) in self.scene.tracked_elements(self.list) {
            let rect = self.scene.bounding_rect(node).context("card is detached")?;
            parts.push(format!("{}@{}", key, rect.y - list_rect.y));
        }
        Ok(parts.join(" "))
    }

    pub fn report_json(report: &FlipReport) -> Result<String> {
        Ok(serde_json::to_string(report)?)
    }
}

fn cards(ids: &[u32]) -> Vec<Card> {
    ids.iter().map(|&id| Card { id }).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Shuffle,
    Remove,
    Insert,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Shuffle, Scenario::Remove, Scenario::Insert];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Shuffle => "shuffle",
            Scenario::Remove => "remove",
            Scenario::Insert => "insert",
        }
    }

    pub fn run(&self, board: &mut Board) -> Result<()> {
        let report = match self {
            Scenario::Shuffle => board.set(&[5, 3, 1, 4, 2])?,
            Scenario::Remove => board.set(&[1, 2, 4, 5])?,
            Scenario::Insert => board.set(&[1, 2, 6, 3, 4, 5])?,
        };
        println!("  report:  {}", Board::report_json(&report)?);
        board.settle()
    }
}
