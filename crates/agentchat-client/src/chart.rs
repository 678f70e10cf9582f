// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Charting collaborators.  A sink receives each chart job only after the
//! view holds the HTML with the job's container in it.

use std::sync::{Arc, Mutex};

use agentchat_render::ChartJob;
use tracing::info;

pub trait ChartSink: Send {
    fn draw(&mut self, job: &ChartJob);
}

/// Logs each job; used where nothing can draw (terminal, one-shot asks).
#[derive(Debug, Default)]
pub struct LogChartSink;

impl ChartSink for LogChartSink {
    fn draw(&mut self, job: &ChartJob) {
        let kind = job
            .config
            .pointer("/chart/type")
            .and_then(|v| v.as_str())
            .unwrap_or("line");
        info!(id = %job.id, kind, "chart ready");
    }
}

/// Emits one `Highcharts.chart(id, config)` call per job into a buffer the
/// HTML document view appends after the transcript.
#[derive(Debug, Clone, Default)]
pub struct ScriptChartSink {
    scripts: Arc<Mutex<Vec<String>>>,
}

impl ScriptChartSink {
    pub(crate) fn shared(scripts: Arc<Mutex<Vec<String>>>) -> Self {
        Self { scripts }
    }
}

/// `Highcharts.chart("chart-1", {...});`
pub fn chart_script(job: &ChartJob) -> String {
    // serde_json output is valid JS, but `</script>` inside a string would
    // end the element early.
    let config = job.config.to_string().replace("</", "<\\/");
    format!("Highcharts.chart({:?}, {config});", job.id)
}

impl ChartSink for ScriptChartSink {
    fn draw(&mut self, job: &ChartJob) {
        if let Ok(mut s) = self.scripts.lock() {
            s.push(chart_script(job));
        }
    }
}
