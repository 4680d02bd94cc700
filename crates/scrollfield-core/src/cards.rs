//! Stacking pipeline cards: each card shrinks and tilts while it scrolls
//! past, then fades out as the next card slides over it.

use crate::math::{ease_in_out_sine, mix, rgb_hex};
use crate::scroll::{Edge, ScrollTracker, SharedProgress, Subscription, TriggerRule};

use glam::Vec3;

/// Illustration shown on the right side of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineVisual {
    Code,
    Neural,
    Graph,
}

/// Static description of a visual, looked up by tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualInfo {
    pub tag: PipelineVisual,
    pub label: &'static str,
    pub hover_scale: f32,
    pub hover_rotation_deg: f32,
    /// Bar heights in percent, for chart-like visuals.
    pub bars: &'static [f32],
}

static VISUALS: [VisualInfo; 3] = [
    VisualInfo {
        tag: PipelineVisual::Code,
        label: "ingest_stream",
        hover_scale: 1.05,
        hover_rotation_deg: 1.0,
        bars: &[],
    },
    VisualInfo {
        tag: PipelineVisual::Neural,
        label: "neural_matrix",
        hover_scale: 1.05,
        hover_rotation_deg: -1.0,
        bars: &[],
    },
    VisualInfo {
        tag: PipelineVisual::Graph,
        label: "insight_graph",
        hover_scale: 1.1,
        hover_rotation_deg: 0.0,
        bars: &[20.0, 32.0, 48.0, 40.0, 56.0],
    },
];

impl PipelineVisual {
    pub fn info(self) -> &'static VisualInfo {
        &VISUALS[self as usize]
    }
}

/// One stage of the pipeline section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineStage {
    pub id: &'static str,
    pub title: &'static str,
    pub accent: u32,
    pub visual: PipelineVisual,
}

impl PipelineStage {
    pub fn accent_rgb(&self) -> Vec3 {
        rgb_hex(self.accent)
    }
}

pub const PIPELINE_STAGES: [PipelineStage; 3] = [
    PipelineStage {
        id: "01",
        title: "Ingest Data",
        accent: 0xfbbf24,
        visual: PipelineVisual::Code,
    },
    PipelineStage {
        id: "02",
        title: "Analyze AI",
        accent: 0x22d3ee,
        visual: PipelineVisual::Neural,
    },
    PipelineStage {
        id: "03",
        title: "Generate Insight",
        accent: 0xd946ef,
        visual: PipelineVisual::Graph,
    },
];

/// Computed presentation of a single card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardStyle {
    pub scale: f32,
    pub rotation_deg: f32,
    pub opacity: f32,
    pub border_radius: f32,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            opacity: 1.0,
            border_radius: 40.0,
        }
    }
}

/// Style of card `index` out of `count`.
///
/// `own` is the card's progress from its top reaching the viewport top to
/// its bottom doing so; `fade` is the next card's progress from its top at
/// half viewport to the viewport top. The last card stays untouched.
pub fn card_style(index: usize, count: usize, own: f32, fade: f32) -> CardStyle {
    if index + 1 >= count {
        return CardStyle::default();
    }
    let own = own.clamp(0.0, 1.0);
    let tilt = if index % 2 == 0 { 4.0 } else { -4.0 };
    CardStyle {
        scale: mix(1.0, 0.7, own),
        rotation_deg: tilt * ease_in_out_sine(own),
        opacity: 1.0 - fade.clamp(0.0, 1.0),
        border_radius: mix(40.0, 48.0, own),
    }
}

struct CardBinding {
    own: SharedProgress,
    fade: SharedProgress,
}

/// Scroll-driven stack of cards bound to a tracker.
pub struct CardStack {
    cards: Vec<CardBinding>,
    subscriptions: Vec<Subscription>,
}

impl CardStack {
    /// Bind every card anchor. Card `i` fades on card `i + 1`'s approach.
    pub fn bind(tracker: &mut ScrollTracker, anchors: &[&str]) -> Self {
        let mut cards = Vec::with_capacity(anchors.len());
        let mut subscriptions = Vec::new();
        for (i, anchor) in anchors.iter().enumerate() {
            let own = SharedProgress::default();
            let fade = SharedProgress::default();
            if i + 1 < anchors.len() {
                subscriptions.push(tracker.bind_shared(
                    *anchor,
                    TriggerRule::new(Edge::Top, Edge::Top),
                    TriggerRule::new(Edge::Bottom, Edge::Top),
                    own.clone(),
                ));
                subscriptions.push(tracker.bind_shared(
                    anchors[i + 1],
                    TriggerRule::new(Edge::Top, Edge::Fraction(0.5)),
                    TriggerRule::new(Edge::Top, Edge::Top),
                    fade.clone(),
                ));
            }
            cards.push(CardBinding { own, fade });
        }
        Self {
            cards,
            subscriptions,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn styles(&self) -> Vec<CardStyle> {
        let count = self.cards.len();
        self.cards
            .iter()
            .enumerate()
            .map(|(i, c)| card_style(i, count, c.own.get(), c.fade.get()))
            .collect()
    }

    /// Remove this stack's bindings from the tracker.
    pub fn unbind(self, tracker: &mut ScrollTracker) {
        for sub in self.subscriptions {
            tracker.unbind(sub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_lookup_matches_tag() {
        for visual in [PipelineVisual::Code, PipelineVisual::Neural, PipelineVisual::Graph] {
            assert_eq!(visual.info().tag, visual);
        }
        assert_eq!(PipelineVisual::Graph.info().bars.len(), 5);
    }

    #[test]
    fn test_last_card_is_never_styled() {
        assert_eq!(card_style(2, 3, 1.0, 1.0), CardStyle::default());
    }

    #[test]
    fn test_card_alternates_tilt() {
        assert!((card_style(0, 3, 1.0, 0.0).rotation_deg - 4.0).abs() < 1e-5);
        assert!((card_style(1, 3, 1.0, 0.0).rotation_deg + 4.0).abs() < 1e-5);
    }
}
