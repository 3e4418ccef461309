//! Review view state
//!
//!     A `ReviewSession` owns everything one open document view needs between renders: the
//!     delivered content and statements, the active filter, the normalization cache, the last
//!     alignment and the active statement.
//!
//!     Content and statements arrive asynchronously in the host application. Each fetch is
//!     issued with a [`ViewTicket`]; a delivery whose ticket belongs to a closed or reopened
//!     view is rejected so late responses never overwrite a newer view.

use crate::align::error::AlignError;
use crate::align::filter::StatementFilter;
use crate::align::fragment::{Fragment, FragmentId};
use crate::align::locate::LocatorConfig;
use crate::align::merge::Span;
use crate::align::navigation::NavigationIndex;
use crate::align::normalize::NormalizationCache;
use crate::align::{Aligner, Alignment, DocumentContent};

/// Proof that a fetch was issued for a given view generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewTicket {
    generation: u64,
}

impl ViewTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct ReviewSession {
    generation: u64,
    live: bool,
    config: LocatorConfig,
    content: Option<DocumentContent>,
    statements: Option<Vec<Fragment>>,
    filter: StatementFilter,
    cache: NormalizationCache,
    alignment: Option<Alignment>,
    navigation: NavigationIndex,
    active: Option<FragmentId>,
}

impl ReviewSession {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a new view, discarding the previous one. Returns the ticket for its fetches.
    pub fn open(&mut self) -> ViewTicket {
        self.reset();
        self.generation += 1;
        self.live = true;
        tracing::debug!(generation = self.generation, "view opened");
        self.ticket()
    }

    /// Ticket for a fetch issued by the current view.
    pub fn begin_fetch(&self) -> ViewTicket {
        self.ticket()
    }

    pub fn close(&mut self) {
        self.reset();
        self.generation += 1;
        self.live = false;
        tracing::debug!(generation = self.generation, "view closed");
    }

    pub fn is_live(&self, ticket: ViewTicket) -> bool {
        self.live && ticket.generation == self.generation
    }

    pub fn deliver_document(
        &mut self,
        ticket: ViewTicket,
        content: DocumentContent,
    ) -> Result<(), AlignError> {
        self.check(ticket)?;
        self.invalidate_document();
        self.content = Some(content);
        Ok(())
    }

    pub fn deliver_statements(
        &mut self,
        ticket: ViewTicket,
        statements: Vec<Fragment>,
    ) -> Result<(), AlignError> {
        self.check(ticket)?;
        self.statements = Some(statements);
        self.alignment = None;
        Ok(())
    }

    /// Forget the cached normalization and the alignment built on it.
    pub fn invalidate_document(&mut self) {
        self.cache.invalidate();
        self.alignment = None;
    }

    pub fn set_filter(&mut self, filter: StatementFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.alignment = None;
        }
    }

    pub fn filter(&self) -> &StatementFilter {
        &self.filter
    }

    pub fn content(&self) -> Option<&DocumentContent> {
        self.content.as_ref()
    }

    pub fn needs_render(&self) -> bool {
        self.alignment.is_none()
    }

    /// Align the filtered statements against the delivered document, replacing the previous
    /// alignment. The active statement survives if it is still navigable.
    pub fn render(&mut self, aligner: &dyn Aligner) -> Result<&Alignment, AlignError> {
        let content = self.content.as_ref().ok_or(AlignError::NoDocumentText)?;
        let statements = self.statements.as_deref().ok_or(AlignError::NoStatements)?;

        let visible = self.filter.apply(statements);
        let alignment = aligner.align(content.raw(), &visible, &self.config, &mut self.cache)?;
        self.navigation = NavigationIndex::build(&visible, &alignment.spans);
        if let Some(active) = &self.active {
            if self.navigation.position(active).is_none() {
                self.active = None;
            }
        }
        Ok(self.alignment.insert(alignment))
    }

    pub fn alignment(&self) -> Option<&Alignment> {
        self.alignment.as_ref()
    }

    pub fn navigation(&self) -> &NavigationIndex {
        &self.navigation
    }

    /// Make `id` the active statement. Returns the index of its span, if it was located.
    pub fn select(&mut self, id: &FragmentId) -> Option<usize> {
        self.navigation.position(id)?;
        self.active = Some(id.clone());
        self.navigation.span_for(id)
    }

    pub fn next(&mut self) -> Option<&FragmentId> {
        let next = self.navigation.next(self.active.as_ref()).cloned();
        self.step(next)
    }

    pub fn previous(&mut self) -> Option<&FragmentId> {
        let previous = self.navigation.previous(self.active.as_ref()).cloned();
        self.step(previous)
    }

    pub fn active(&self) -> Option<&FragmentId> {
        self.active.as_ref()
    }

    pub fn active_span(&self) -> Option<&Span> {
        let index = self.navigation.span_for(self.active.as_ref()?)?;
        self.alignment.as_ref()?.spans.get(index)
    }

    fn step(&mut self, target: Option<FragmentId>) -> Option<&FragmentId> {
        // At either end the active statement stays where it is.
        if target.is_some() {
            self.active = target;
            self.active.as_ref()
        } else {
            None
        }
    }

    fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: self.generation,
        }
    }

    fn check(&self, ticket: ViewTicket) -> Result<(), AlignError> {
        if self.is_live(ticket) {
            Ok(())
        } else {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "stale delivery rejected"
            );
            Err(AlignError::StaleView {
                ticket: ticket.generation,
                current: self.generation,
            })
        }
    }

    fn reset(&mut self) {
        self.content = None;
        self.statements = None;
        self.cache.invalidate();
        self.alignment = None;
        self.navigation = NavigationIndex::default();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::FlatAligner;

    const DOCUMENT: &str = "The vendor shall deliver the goods. The buyer may inspect the goods.";

    fn statements() -> Vec<Fragment> {
        vec![
            Fragment::new("1", "The vendor shall deliver the goods.").with_directive("shall"),
            Fragment::new("2", "The buyer may inspect the goods.").with_directive("may"),
        ]
    }

    fn ready_session() -> ReviewSession {
        let mut session = ReviewSession::new(LocatorConfig::default());
        let ticket = session.open();
        session
            .deliver_document(ticket, DocumentContent::Flat(DOCUMENT.to_string()))
            .unwrap();
        session.deliver_statements(ticket, statements()).unwrap();
        session
    }

    #[test]
    fn render_requires_both_inputs() {
        let mut session = ReviewSession::default();
        let ticket = session.open();
        assert_eq!(
            session.render(&FlatAligner).unwrap_err(),
            AlignError::NoDocumentText
        );
        session
            .deliver_document(ticket, DocumentContent::Flat(DOCUMENT.to_string()))
            .unwrap();
        assert_eq!(
            session.render(&FlatAligner).unwrap_err(),
            AlignError::NoStatements
        );
    }

    #[test]
    fn late_delivery_after_reopen_is_rejected() {
        let mut session = ReviewSession::default();
        let old = session.open();
        let current = session.open();
        let err = session
            .deliver_statements(old, statements())
            .unwrap_err();
        assert_eq!(
            err,
            AlignError::StaleView {
                ticket: old.generation(),
                current: current.generation(),
            }
        );
        assert!(session.is_live(session.begin_fetch()));

        session.close();
        assert!(!session.is_live(current));
    }

    #[test]
    fn navigation_follows_filtered_order() {
        let mut session = ready_session();
        assert_eq!(session.render(&FlatAligner).unwrap().spans.len(), 2);

        assert_eq!(session.next().map(FragmentId::as_str), Some("1"));
        assert_eq!(session.next().map(FragmentId::as_str), Some("2"));
        assert_eq!(session.next(), None);
        assert_eq!(session.active().map(FragmentId::as_str), Some("2"));
        assert_eq!(session.active_span().map(|span| span.start), Some(36));
    }

    #[test]
    fn filter_change_drops_hidden_active_statement() {
        let mut session = ready_session();
        session.render(&FlatAligner).unwrap();
        assert_eq!(session.select(&FragmentId::from("2")), Some(1));

        session.set_filter(StatementFilter::new().with_directive("shall"));
        assert!(session.needs_render());
        let alignment = session.render(&FlatAligner).unwrap();
        assert_eq!(alignment.spans.len(), 1);
        assert_eq!(session.active(), None);
    }
}
