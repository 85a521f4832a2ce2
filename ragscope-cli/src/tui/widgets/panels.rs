//! Results area: the six inspection panels of a loaded result, stacked in order in
//! one scrollable view.
//!
//! Text is wrapped with `textwrap` rather than by the `Paragraph`, so the line offset
//! of every panel heading is known and selecting a panel can scroll straight to it.

use crate::tui::theme::Theme;
use ragscope_core::render::{
    AnswerPanel, ChunksPanel, ContextPanel, DOCUMENTS_UNAVAILABLE, DocumentsPanel,
    EMBEDDINGS_UNAVAILABLE, EmbeddingPanel, NO_CHUNKS, PanelKind, Panels, SCORE_BAND_THRESHOLD,
    SCORES_UNAVAILABLE, ScoresPanel, format_vector,
};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::collections::HashSet;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows of the full score list visible at once when it is expanded.
pub const SCORES_WINDOW: usize = 10;

const INDENT: &str = "  ";

/// Selection, expansion and scroll state of the results area.
///
/// Documents expand one entry at a time: `doc_cursor` picks the entry that
/// `Space` toggles. Scores and embeddings expand as a whole panel.
#[derive(Debug, Clone)]
pub struct PanelsView {
    selected: PanelKind,
    expanded: HashSet<PanelKind>,
    expanded_docs: HashSet<usize>,
    doc_cursor: usize,
    doc_count: usize,
    follow_doc: bool,
    scroll: usize,
    scores_offset: usize,
    follow_selected: bool,
    viewport_height: usize,
    total_lines: usize,
    offsets: [usize; 6],
}

impl Default for PanelsView {
    fn default() -> Self {
        Self {
            selected: PanelKind::Chunks,
            expanded: HashSet::new(),
            expanded_docs: HashSet::new(),
            doc_cursor: 0,
            doc_count: 0,
            follow_doc: false,
            scroll: 0,
            scores_offset: 0,
            follow_selected: false,
            viewport_height: 0,
            total_lines: 0,
            offsets: [0; 6],
        }
    }
}

impl PanelsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top with every collapsible panel collapsed, for a fresh result.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.expanded_docs.clear();
        self.doc_cursor = 0;
        self.scroll = 0;
        self.scores_offset = 0;
        self.follow_selected = false;
        self.follow_doc = false;
    }

    pub fn selected(&self) -> PanelKind {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scores_offset(&self) -> usize {
        self.scores_offset
    }

    /// Whether the body of `kind` is shown. Non-collapsible panels always are;
    /// the documents panel counts as expanded while any entry is open.
    pub fn is_expanded(&self, kind: PanelKind) -> bool {
        match kind {
            PanelKind::Documents => !self.expanded_docs.is_empty(),
            _ => !kind.is_collapsible() || self.expanded.contains(&kind),
        }
    }

    /// Index of the document entry under the cursor.
    pub fn doc_cursor(&self) -> usize {
        self.doc_cursor
    }

    pub fn is_document_expanded(&self, index: usize) -> bool {
        self.expanded_docs.contains(&index)
    }

    /// Move the document cursor by `delta` entries. Only applies while the
    /// documents panel is selected.
    pub fn move_entry(&mut self, delta: isize) -> bool {
        if self.selected != PanelKind::Documents {
            return false;
        }
        self.doc_cursor = self
            .doc_cursor
            .saturating_add_signed(delta)
            .min(self.doc_count.saturating_sub(1));
        self.follow_doc = true;
        true
    }

    /// Select the panel at `index` in display order and scroll to it.
    pub fn select(&mut self, index: usize) {
        if let Some(kind) = PanelKind::ORDER.get(index) {
            self.selected = *kind;
            self.follow_selected = true;
        }
    }

    /// Expand or collapse the selected panel. Returns false if it is not collapsible.
    pub fn toggle_selected(&mut self) -> bool {
        let kind = self.selected;
        if !kind.is_collapsible() {
            return false;
        }
        if kind == PanelKind::Documents {
            if !self.expanded_docs.remove(&self.doc_cursor) {
                self.expanded_docs.insert(self.doc_cursor);
            }
            self.follow_doc = true;
            return true;
        }
        if !self.expanded.remove(&kind) {
            self.expanded.insert(kind);
        }
        if kind == PanelKind::Scores {
            self.scores_offset = 0;
        }
        self.follow_selected = true;
        true
    }

    /// Scroll by `delta` lines. An expanded score list scrolls on its own while
    /// it is selected.
    pub fn scroll_by(&mut self, delta: isize) {
        if self.selected == PanelKind::Scores && self.is_expanded(PanelKind::Scores) {
            self.scores_offset = self.scores_offset.saturating_add_signed(delta);
        } else {
            self.follow_selected = false;
            self.scroll = self
                .scroll
                .saturating_add_signed(delta)
                .min(self.max_scroll());
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.page_size() as isize));
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page_size() as isize);
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_selected = false;
        self.scroll = 0;
        self.scores_offset = 0;
    }

    fn page_size(&self) -> usize {
        self.viewport_height.saturating_sub(1).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height)
    }

    /// Record the geometry of the last render and clamp the scroll positions.
    fn update_viewport(&mut self, height: usize, layout: &PanelLayout) {
        self.viewport_height = height;
        self.total_lines = layout.lines.len();
        self.offsets = layout.offsets;
        self.doc_count = layout.doc_offsets.len();
        self.doc_cursor = self.doc_cursor.min(self.doc_count.saturating_sub(1));
        if self.follow_selected {
            self.scroll = self.offsets[self.selected.index()];
            self.follow_selected = false;
        } else if self.follow_doc {
            if let Some(&line) = layout.doc_offsets.get(self.doc_cursor) {
                if line < self.scroll {
                    self.scroll = line;
                } else if height > 0 && line >= self.scroll + height {
                    self.scroll = line + 1 - height;
                }
            }
        }
        self.follow_doc = false;
        self.scroll = self.scroll.min(self.max_scroll());
        self.scores_offset = self
            .scores_offset
            .min(layout.score_rows.saturating_sub(SCORES_WINDOW));
    }
}

/// Wrapped lines of every panel plus the line index of each heading and of
/// each document entry.
struct PanelLayout {
    lines: Vec<Line<'static>>,
    offsets: [usize; 6],
    doc_offsets: Vec<usize>,
    score_rows: usize,
}

/// Render the results area.
pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    panels: &Panels,
    view: &mut PanelsView,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);

    let layout = build_layout(panels, view, inner.width as usize, theme);
    view.update_viewport(inner.height as usize, &layout);

    let scroll = u16::try_from(view.scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(layout.lines)
        .style(theme.base_style())
        .scroll((scroll, 0))
        .block(block);
    frame.render_widget(paragraph, area);
}

fn build_layout(panels: &Panels, view: &PanelsView, width: usize, theme: &Theme) -> PanelLayout {
    let mut out = LineBuilder {
        lines: Vec::new(),
        width: width.max(1),
    };
    let mut offsets = [0; 6];
    let mut doc_offsets = Vec::new();
    let mut score_rows = 0;

    for kind in PanelKind::ORDER {
        offsets[kind.index()] = out.lines.len();
        let expanded = view.is_expanded(kind);
        out.push(heading(kind, panels, expanded, view.selected == kind, theme));

        match kind {
            PanelKind::Documents => match &panels.documents {
                DocumentsPanel::Unavailable => out.text(DOCUMENTS_UNAVAILABLE, theme.muted_style()),
                DocumentsPanel::Entries(entries) if entries.is_empty() => {
                    out.text("No documents.", theme.muted_style())
                }
                DocumentsPanel::Entries(entries) => {
                    let cursor = view.doc_cursor.min(entries.len().saturating_sub(1));
                    for (i, entry) in entries.iter().enumerate() {
                        doc_offsets.push(out.lines.len());
                        let mut name_style = Style::default().fg(theme.fg);
                        if view.selected == PanelKind::Documents && i == cursor {
                            name_style = name_style.bg(theme.selection_bg).add_modifier(Modifier::BOLD);
                        }
                        if view.is_document_expanded(i) {
                            out.push(Line::from(Span::styled(
                                format!("▾ {}", entry.name),
                                name_style.patch(theme.title_style()),
                            )));
                            out.indented(&entry.text, Style::default().fg(theme.fg));
                        } else {
                            out.push(Line::from(vec![
                                Span::styled(format!("▸ {}", entry.name), name_style),
                                Span::styled(
                                    format!("  ({} chars)", entry.char_count()),
                                    theme.muted_style(),
                                ),
                            ]));
                        }
                    }
                }
            },
            PanelKind::Chunks => match &panels.chunks {
                ChunksPanel::NoChunks => out.text(NO_CHUNKS, theme.muted_style()),
                ChunksPanel::Entries { rows, hidden } => {
                    for row in rows {
                        out.push(Line::from(vec![
                            Span::styled(format!("#{} ", row.rank), theme.title_style()),
                            Span::styled(
                                format!("score {}", row.score),
                                Style::default().fg(theme.accent),
                            ),
                            Span::styled(
                                format!("  {}  chunk {}", row.file, row.chunk_id),
                                theme.muted_style(),
                            ),
                        ]));
                        out.indented(&row.text, Style::default().fg(theme.fg));
                    }
                    if *hidden > 0 {
                        out.text(
                            &format!("(+{} more beyond top-k)", hidden),
                            theme.muted_style(),
                        );
                    }
                }
            },
            PanelKind::Context => match &panels.context {
                ContextPanel::Verbatim(text) => out.text(text, Style::default().fg(theme.fg)),
                ContextPanel::Assembled(text) => {
                    out.text("(assembled from the retrieved chunks)", theme.muted_style());
                    out.text(text, Style::default().fg(theme.fg));
                }
                ContextPanel::NotReturned => out.text(panels.context.text(), theme.muted_style()),
            },
            PanelKind::Answer => match &panels.answer {
                AnswerPanel::Answer(text) => out.text(text, Style::default().fg(theme.success_fg)),
                AnswerPanel::NoAnswer => out.text(panels.answer.text(), theme.muted_style()),
            },
            PanelKind::Scores => match &panels.scores {
                ScoresPanel::Unavailable => out.text(SCORES_UNAVAILABLE, theme.muted_style()),
                ScoresPanel::Entries(rows) => {
                    score_rows = rows.len();
                    if expanded {
                        let start = view.scores_offset.min(rows.len().saturating_sub(SCORES_WINDOW));
                        let end = (start + SCORES_WINDOW).min(rows.len());
                        for row in &rows[start..end] {
                            let meta = format!("{}  {}  chunk {}  ", row.score, row.file, row.chunk_id);
                            let room = out.width.saturating_sub(meta.width());
                            out.push(Line::from(vec![
                                Span::styled(
                                    meta,
                                    Style::default().fg(theme.score_band_color(row.band)),
                                ),
                                Span::styled(
                                    truncate_to_width(&row.text.replace('\n', " "), room),
                                    theme.muted_style(),
                                ),
                            ]));
                        }
                        if rows.len() > SCORES_WINDOW {
                            out.text(
                                &format!("rows {}–{} of {} (↑↓ scroll)", start + 1, end, rows.len()),
                                theme.muted_style(),
                            );
                        }
                    }
                }
            },
            PanelKind::Embeddings => match &panels.embeddings {
                EmbeddingPanel::Unavailable => out.text(EMBEDDINGS_UNAVAILABLE, theme.muted_style()),
                EmbeddingPanel::Preview { query, chunks } => {
                    if expanded {
                        if let Some(query) = query {
                            out.text(&format!("query    {}", format_vector(query)), Style::default().fg(theme.fg));
                        }
                        for (i, vector) in chunks.iter().enumerate() {
                            out.text(
                                &format!("chunk {:<3} {}", i, format_vector(vector)),
                                Style::default().fg(theme.fg),
                            );
                        }
                    }
                }
            },
        }
        out.push(Line::default());
    }

    PanelLayout {
        lines: out.lines,
        offsets,
        doc_offsets,
        score_rows,
    }
}

fn heading(
    kind: PanelKind,
    panels: &Panels,
    expanded: bool,
    selected: bool,
    theme: &Theme,
) -> Line<'static> {
    let mut title_style = theme.title_style();
    if selected {
        title_style = title_style.bg(theme.selection_bg).add_modifier(Modifier::UNDERLINED);
    }
    let marker = match (kind.is_collapsible(), expanded) {
        (false, _) => "",
        (true, true) => " ▾",
        (true, false) => " ▸",
    };
    let mut spans = vec![
        Span::styled(format!("[{}] ", kind.index() + 1), theme.muted_style()),
        Span::styled(format!("{}{}", kind.title(), marker), title_style),
    ];
    if let Some(summary) = summary(kind, panels) {
        spans.push(Span::styled(format!("  {}", summary), theme.muted_style()));
    }
    Line::from(spans)
}

fn summary(kind: PanelKind, panels: &Panels) -> Option<String> {
    match kind {
        PanelKind::Documents => match &panels.documents {
            DocumentsPanel::Entries(entries) => Some(format!("({} documents)", entries.len())),
            DocumentsPanel::Unavailable => None,
        },
        PanelKind::Scores => match &panels.scores {
            ScoresPanel::Entries(rows) => {
                let (high, low) = panels.scores.band_counts();
                Some(format!(
                    "({} scored: {} ≥ {}, {} below)",
                    rows.len(),
                    high,
                    SCORE_BAND_THRESHOLD,
                    low
                ))
            }
            ScoresPanel::Unavailable => None,
        },
        PanelKind::Embeddings => match &panels.embeddings {
            EmbeddingPanel::Preview { query, chunks } => Some(format!(
                "({}{} chunk vectors)",
                if query.is_some() { "query + " } else { "" },
                chunks.len()
            )),
            EmbeddingPanel::Unavailable => None,
        },
        PanelKind::Chunks | PanelKind::Context | PanelKind::Answer => None,
    }
}

struct LineBuilder {
    lines: Vec<Line<'static>>,
    width: usize,
}

impl LineBuilder {
    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn text(&mut self, text: &str, style: Style) {
        for line in wrap_text(text, self.width) {
            self.lines.push(Line::styled(line, style));
        }
    }

    fn indented(&mut self, text: &str, style: Style) {
        let width = self.width.saturating_sub(INDENT.len()).max(1);
        for line in wrap_text(text, width) {
            self.lines.push(Line::styled(format!("{}{}", INDENT, line), style));
        }
    }
}

/// Wrap `text` to `width` columns, keeping blank lines. Words wider than `width`
/// are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Cut `text` to at most `max` display columns, ending with `…` when shortened.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
