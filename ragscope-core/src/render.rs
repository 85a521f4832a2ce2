//! Result renderer contract.
//!
//! Maps a `Loaded` session into the fixed, ordered set of inspection panels. Both
//! front ends (the TUI widgets and the plain-text printer) consume this model, so the
//! fallback rules below live in exactly one place.

use crate::result::{Answer, NO_ANSWER_PLACEHOLDER, PipelineResult, ScoredChunk};
use crate::session::SessionState;

/// Scores at or above this value fall into the high band of the full score list.
pub const SCORE_BAND_THRESHOLD: f64 = 0.4;

/// Placeholder for a missing score, file or chunk id.
pub const MISSING_VALUE: &str = "—";

pub const DOCUMENTS_UNAVAILABLE: &str = "Raw documents were not returned by the backend.";
pub const NO_CHUNKS: &str = "No chunks were retrieved for this query.";
pub const CONTEXT_NOT_RETURNED: &str = "Final context was not returned.";
pub const NO_ANSWER: &str = NO_ANSWER_PLACEHOLDER;
pub const SCORES_UNAVAILABLE: &str = "Similarity scores were not returned by the backend.";
pub const EMBEDDINGS_UNAVAILABLE: &str = "Embedding previews were not returned by the backend.";

/// Format a score with four decimals, or [`MISSING_VALUE`].
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => format!("{:.4}", s),
        _ => MISSING_VALUE.to_string(),
    }
}

/// Identity of each panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Documents,
    Chunks,
    Context,
    Answer,
    Scores,
    Embeddings,
}

impl PanelKind {
    pub const ORDER: [PanelKind; 6] = [
        PanelKind::Documents,
        PanelKind::Chunks,
        PanelKind::Context,
        PanelKind::Answer,
        PanelKind::Scores,
        PanelKind::Embeddings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Documents => "Raw Documents",
            Self::Chunks => "Top-K Chunks",
            Self::Context => "Final Context",
            Self::Answer => "Generated Answer",
            Self::Scores => "Full Similarity Scores",
            Self::Embeddings => "Embedding Preview",
        }
    }

    /// Whether the panel starts collapsed and can be toggled.
    pub fn is_collapsible(&self) -> bool {
        matches!(self, Self::Documents | Self::Scores | Self::Embeddings)
    }

    pub fn index(&self) -> usize {
        Self::ORDER.iter().position(|k| k == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEntry {
    pub name: String,
    pub text: String,
}

impl DocumentEntry {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentsPanel {
    Unavailable,
    Entries(Vec<DocumentEntry>),
}

/// One displayed row of the top-K panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRow {
    /// 1-based position in backend order.
    pub rank: usize,
    pub score: String,
    pub file: String,
    pub chunk_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunksPanel {
    NoChunks,
    Entries {
        rows: Vec<ChunkRow>,
        /// Rows the backend returned beyond the display limit.
        hidden: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextPanel {
    /// `final_context` as sent by the backend.
    Verbatim(String),
    /// Chunk texts joined by a blank line, used when `final_context` is absent.
    Assembled(String),
    NotReturned,
}

impl ContextPanel {
    pub fn text(&self) -> &str {
        match self {
            Self::Verbatim(text) | Self::Assembled(text) => text,
            Self::NotReturned => CONTEXT_NOT_RETURNED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerPanel {
    Answer(String),
    NoAnswer,
}

impl AnswerPanel {
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(text) => text,
            Self::NoAnswer => NO_ANSWER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Low,
}

impl ScoreBand {
    pub fn of(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= SCORE_BAND_THRESHOLD => Self::High,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub score: String,
    pub band: ScoreBand,
    pub file: String,
    pub chunk_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoresPanel {
    Unavailable,
    Entries(Vec<ScoreRow>),
}

impl ScoresPanel {
    /// (high band, low band) counts.
    pub fn band_counts(&self) -> (usize, usize) {
        match self {
            Self::Unavailable => (0, 0),
            Self::Entries(rows) => {
                let high = rows.iter().filter(|r| r.band == ScoreBand::High).count();
                (high, rows.len() - high)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingPanel {
    Unavailable,
    Preview {
        query: Option<Vec<f64>>,
        chunks: Vec<Vec<f64>>,
    },
}

/// Every panel for one loaded result, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Panels {
    pub documents: DocumentsPanel,
    pub chunks: ChunksPanel,
    pub context: ContextPanel,
    pub answer: AnswerPanel,
    pub scores: ScoresPanel,
    pub embeddings: EmbeddingPanel,
}

/// Build panels for `state`. Only a `Loaded` state produces panels.
pub fn render_panels(state: &SessionState, top_k: u32) -> Option<Panels> {
    match state {
        SessionState::Loaded { result, answer } => Some(build_panels(result, answer, top_k)),
        SessionState::Idle | SessionState::Submitting { .. } | SessionState::Failed { .. } => None,
    }
}

pub fn build_panels(result: &PipelineResult, answer: &Answer, top_k: u32) -> Panels {
    Panels {
        documents: documents_panel(result),
        chunks: chunks_panel(result, top_k as usize),
        context: context_panel(result),
        answer: match answer {
            Answer::Generated(text) => AnswerPanel::Answer(text.clone()),
            Answer::Missing => AnswerPanel::NoAnswer,
        },
        scores: scores_panel(result),
        embeddings: embedding_panel(result),
    }
}

fn documents_panel(result: &PipelineResult) -> DocumentsPanel {
    match &result.documents {
        None => DocumentsPanel::Unavailable,
        Some(docs) => DocumentsPanel::Entries(
            docs.iter()
                .map(|(name, text)| DocumentEntry {
                    name: name.clone(),
                    text: text.clone(),
                })
                .collect(),
        ),
    }
}

fn chunks_panel(result: &PipelineResult, top_k: usize) -> ChunksPanel {
    let chunks = match &result.top_k_chunks {
        Some(chunks) if !chunks.is_empty() => chunks,
        _ => return ChunksPanel::NoChunks,
    };
    let rows = chunks
        .iter()
        .take(top_k)
        .enumerate()
        .map(|(i, chunk)| ChunkRow {
            rank: i + 1,
            score: format_score(chunk.score),
            file: chunk_file(chunk),
            chunk_id: chunk_id(chunk),
            text: chunk.text.clone().unwrap_or_default(),
        })
        .collect();
    ChunksPanel::Entries {
        rows,
        hidden: chunks.len().saturating_sub(top_k),
    }
}

fn context_panel(result: &PipelineResult) -> ContextPanel {
    if let Some(context) = &result.final_context
        && !context.trim().is_empty()
    {
        return ContextPanel::Verbatim(context.clone());
    }
    let assembled = assemble_context(result.top_k_chunks.as_deref().unwrap_or_default());
    if assembled.is_empty() {
        ContextPanel::NotReturned
    } else {
        ContextPanel::Assembled(assembled)
    }
}

/// Join the non-empty chunk texts in order with exactly one blank line.
///
/// Chunks with a missing or empty `text` are skipped, unlike a plain join over
/// every returned chunk.
pub fn assemble_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .filter_map(|c| c.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn scores_panel(result: &PipelineResult) -> ScoresPanel {
    match &result.similarity_data {
        None => ScoresPanel::Unavailable,
        Some(data) => ScoresPanel::Entries(
            data.iter()
                .map(|chunk| ScoreRow {
                    score: format_score(chunk.score),
                    band: ScoreBand::of(chunk.score),
                    file: chunk_file(chunk),
                    chunk_id: chunk_id(chunk),
                    text: chunk.text.clone().unwrap_or_default(),
                })
                .collect(),
        ),
    }
}

fn embedding_panel(result: &PipelineResult) -> EmbeddingPanel {
    match (&result.query_embedding_preview, &result.chunk_embeddings_preview) {
        (None, None) => EmbeddingPanel::Unavailable,
        (query, chunks) => EmbeddingPanel::Preview {
            query: query.clone(),
            chunks: chunks.clone().unwrap_or_default(),
        },
    }
}

fn chunk_file(chunk: &ScoredChunk) -> String {
    chunk
        .file
        .clone()
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

fn chunk_id(chunk: &ScoredChunk) -> String {
    chunk
        .chunk_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// Format an embedding preview vector compactly.
pub fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.3}", v)).collect();
    format!("[{}]", parts.join(", "))
}

/// Options for [`Panels::to_plain_text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Print full document bodies instead of name + size.
    pub expand_documents: bool,
    /// Print the full similarity list instead of the band summary.
    pub expand_scores: bool,
}

impl Panels {
    /// Plain-text rendering of every panel, in order.
    pub fn to_plain_text(&self, options: TextOptions) -> String {
        let mut out = String::new();
        for kind in PanelKind::ORDER {
            out.push_str(&format!("== {} ==\n", kind.title()));
            self.write_panel(kind, options, &mut out);
            out.push('\n');
        }
        out
    }

    fn write_panel(&self, kind: PanelKind, options: TextOptions, out: &mut String) {
        match kind {
            PanelKind::Documents => match &self.documents {
                DocumentsPanel::Unavailable => push_line(out, DOCUMENTS_UNAVAILABLE),
                DocumentsPanel::Entries(entries) if entries.is_empty() => {
                    push_line(out, "(0 documents)")
                }
                DocumentsPanel::Entries(entries) => {
                    for entry in entries {
                        if options.expand_documents {
                            push_line(out, &format!("▾ {}", entry.name));
                            push_line(out, &entry.text);
                        } else {
                            push_line(
                                out,
                                &format!("▸ {} ({} chars)", entry.name, entry.char_count()),
                            );
                        }
                    }
                }
            },
            PanelKind::Chunks => match &self.chunks {
                ChunksPanel::NoChunks => push_line(out, NO_CHUNKS),
                ChunksPanel::Entries { rows, hidden } => {
                    for row in rows {
                        push_line(
                            out,
                            &format!(
                                "#{} score {} | {} | chunk {}",
                                row.rank, row.score, row.file, row.chunk_id
                            ),
                        );
                        push_line(out, &row.text);
                    }
                    if *hidden > 0 {
                        push_line(out, &format!("(+{} more beyond top-k)", hidden));
                    }
                }
            },
            PanelKind::Context => push_line(out, self.context.text()),
            PanelKind::Answer => push_line(out, self.answer.text()),
            PanelKind::Scores => match &self.scores {
                ScoresPanel::Unavailable => push_line(out, SCORES_UNAVAILABLE),
                ScoresPanel::Entries(rows) => {
                    let (high, low) = self.scores.band_counts();
                    push_line(
                        out,
                        &format!(
                            "{} scored chunks: {} ≥ {} | {} below",
                            rows.len(),
                            high,
                            SCORE_BAND_THRESHOLD,
                            low
                        ),
                    );
                    if options.expand_scores {
                        for row in rows {
                            let marker = match row.band {
                                ScoreBand::High => '+',
                                ScoreBand::Low => '-',
                            };
                            push_line(
                                out,
                                &format!(
                                    "{} {} | {} | chunk {}",
                                    marker, row.score, row.file, row.chunk_id
                                ),
                            );
                        }
                    }
                }
            },
            PanelKind::Embeddings => match &self.embeddings {
                EmbeddingPanel::Unavailable => push_line(out, EMBEDDINGS_UNAVAILABLE),
                EmbeddingPanel::Preview { query, chunks } => {
                    if let Some(query) = query {
                        push_line(out, &format!("query {}", format_vector(query)));
                    }
                    push_line(out, &format!("{} chunk vectors", chunks.len()));
                }
            },
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
