// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use agentchat_config::RenderFeatures;
use agentchat_session::{ConversationTurn, Role};
use tracing::debug;

use crate::annotate::{ChartIds, ChartJob, PostProcessor};
use crate::render_markdown;

/// HTML of one turn, without the surrounding message container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTurn {
    pub role: Role,
    pub html: String,
}

impl RenderedTurn {
    /// `<div class="chat-message {role}">…</div>`
    pub fn to_container(&self) -> String {
        format!("<div class=\"chat-message {}\">{}</div>", self.role, self.html)
    }
}

/// The whole chat view, rebuilt from scratch on every render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTranscript {
    pub turns: Vec<RenderedTurn>,
    /// Charts to draw after the HTML is attached to the view, in order.
    pub charts: Vec<ChartJob>,
}

impl RenderedTranscript {
    pub fn html(&self) -> String {
        self.turns
            .iter()
            .map(RenderedTurn::to_container)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The most recent turn, i.e. what the view scrolls to.
    pub fn latest(&self) -> Option<&RenderedTurn> {
        self.turns.last()
    }
}

/// Maps a conversation log through the Markdown pipeline.
#[derive(Debug, Clone)]
pub struct TranscriptRenderer {
    features: RenderFeatures,
    post: PostProcessor,
}

impl TranscriptRenderer {
    /// Renderer using the process-wide chart id allocator.
    pub fn new(features: RenderFeatures) -> Self {
        Self::with_chart_ids(features, ChartIds::global())
    }

    pub fn with_chart_ids(features: RenderFeatures, ids: Arc<ChartIds>) -> Self {
        Self {
            features,
            post: PostProcessor::new(ids),
        }
    }

    /// Renders one turn; annotations only run for assistant turns.
    pub fn render_turn(&self, turn: &ConversationTurn) -> (RenderedTurn, Vec<ChartJob>) {
        let html = render_markdown(&turn.content, &self.features);
        if turn.role == Role::Assistant && self.features.annotations {
            let processed = self.post.process(&html);
            let charts = processed.chart_jobs().cloned().collect();
            (RenderedTurn { role: turn.role, html: processed.html }, charts)
        } else {
            (RenderedTurn { role: turn.role, html }, Vec::new())
        }
    }

    pub fn render<'a>(
        &self,
        turns: impl IntoIterator<Item = &'a ConversationTurn>,
    ) -> RenderedTranscript {
        let mut out = RenderedTranscript::default();
        for turn in turns {
            let (rendered, charts) = self.render_turn(turn);
            out.turns.push(rendered);
            out.charts.extend(charts);
        }
        debug!(turns = out.turns.len(), charts = out.charts.len(), "transcript rendered");
        out
    }
}
