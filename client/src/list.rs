//! Lista paginata - Filtri, ordinamento e pagina tradotti in un'unica query canonica
//!
//! Ogni modifica produce una nuova richiesta. Solo la risposta all'ultima
//! richiesta viene mostrata: le precedenti vengono interrotte e, se arrivano
//! comunque, scartate dal controllo sul numero di sequenza.

use crate::dto::Pagination;
use crate::error::{ClientError, Result};
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    #[default]
    All,
    Free,
    Pro,
    Elite,
}

impl Tier {
    fn as_query(self) -> Option<&'static str> {
        match self {
            Tier::All => None,
            Tier::Free => Some("free"),
            Tier::Pro => Some("pro"),
            Tier::Elite => Some("elite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountStatus {
    #[default]
    All,
    Active,
    Suspended,
    Locked,
}

impl AccountStatus {
    fn as_query(self) -> Option<&'static str> {
        match self {
            AccountStatus::All => None,
            AccountStatus::Active => Some("active"),
            AccountStatus::Suspended => Some("suspended"),
            AccountStatus::Locked => Some("locked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    CreatedAt,
    Name,
    Email,
    Tier,
    Status,
}

impl SortBy {
    fn as_query(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::Name => "name",
            SortBy::Email => "email",
            SortBy::Tier => "tier",
            SortBy::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_query(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Modifica di un controllo della lista
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    Search(String),
    Tier(Tier),
    Status(AccountStatus),
    Sort(SortBy, SortOrder),
    Page(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    page_size: u32,
    search: String,
    tier: Tier,
    status: AccountStatus,
    sort_by: SortBy,
    sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            tier: Tier::All,
            status: AccountStatus::All,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn sort(&self) -> (SortBy, SortOrder) {
        (self.sort_by, self.sort_order)
    }

    /// Applica una modifica. Tutto tranne la navigazione di pagina riporta a pagina 1.
    pub fn apply(&mut self, change: QueryChange) {
        match change {
            QueryChange::Page(page) => {
                self.page = page.max(1);
                return;
            }
            QueryChange::Search(search) => self.search = search,
            QueryChange::Tier(tier) => self.tier = tier,
            QueryChange::Status(status) => self.status = status,
            QueryChange::Sort(by, order) => {
                self.sort_by = by;
                self.sort_order = order;
            }
        }
        self.page = 1;
    }

    /// Parametri nell'ordine canonico; filtri `all` e ricerca vuota omessi
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(tier) = self.tier.as_query() {
            pairs.push(("tier", tier.to_string()));
        }
        if let Some(status) = self.status.as_query() {
            pairs.push(("status", status.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        pairs.push(("sortBy", self.sort_by.as_query().to_string()));
        pairs.push(("sortOrder", self.sort_order.as_query().to_string()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<R> {
    Loading,
    Error(String),
    Empty,
    Populated { rows: Vec<R>, pagination: Pagination },
}

/// Sorgente delle pagine della lista
pub trait ListApi<R> {
    async fn fetch(&self, query: &ListQuery) -> Result<Page<R>>;
}

/// Risultato di una richiesta, etichettato con il suo numero di sequenza
#[derive(Debug)]
pub struct FetchOutcome<R> {
    pub seq: u64,
    pub result: Result<Page<R>>,
}

/// Richiesta emessa dal controller, da eseguire con [`PendingFetch::run`]
pub struct PendingFetch<R, A> {
    seq: u64,
    query: ListQuery,
    api: Arc<A>,
    registration: AbortRegistration,
    _row: PhantomData<fn() -> R>,
}

impl<R, A: ListApi<R>> PendingFetch<R, A> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Esegue la richiesta; se nel frattempo è stata superata termina con `Aborted`
    pub async fn run(self) -> FetchOutcome<R> {
        let PendingFetch {
            seq,
            query,
            api,
            registration,
            ..
        } = self;

        let fetch = async move { api.fetch(&query).await };
        let result = Abortable::new(fetch, registration)
            .await
            .unwrap_or_else(|_| Err(ClientError::Aborted));
        FetchOutcome { seq, result }
    }
}

pub struct ListController<R, A> {
    api: Arc<A>,
    query: ListQuery,
    state: ListState<R>,
    latest: u64,
    in_flight: Option<AbortHandle>,
}

impl<R, A: ListApi<R>> ListController<R, A> {
    pub fn new(api: A, query: ListQuery) -> Self {
        Self {
            api: Arc::new(api),
            query,
            state: ListState::Loading,
            latest: 0,
            in_flight: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn state(&self) -> &ListState<R> {
        &self.state
    }

    /// Applica la modifica e prepara la nuova richiesta, interrompendo quella in corso
    pub fn request(&mut self, change: QueryChange) -> PendingFetch<R, A> {
        self.query.apply(change);
        self.issue()
    }

    /// Ripete la query corrente senza modificarla
    pub fn refresh(&mut self) -> PendingFetch<R, A> {
        self.issue()
    }

    fn issue(&mut self) -> PendingFetch<R, A> {
        self.latest += 1;
        if let Some(previous) = self.in_flight.take() {
            debug!("Aborting superseded list request");
            previous.abort();
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        self.state = ListState::Loading;

        PendingFetch {
            seq: self.latest,
            query: self.query.clone(),
            api: Arc::clone(&self.api),
            registration,
            _row: PhantomData,
        }
    }

    /// Applica un risultato solo se appartiene all'ultima richiesta emessa.
    /// Ritorna `false` se il risultato era obsoleto ed è stato scartato.
    pub fn apply(&mut self, outcome: FetchOutcome<R>) -> bool {
        if outcome.seq != self.latest {
            debug!(
                "Discarding stale list response {} (latest is {})",
                outcome.seq, self.latest
            );
            return false;
        }
        self.in_flight = None;

        self.state = match outcome.result {
            Ok(page) if page.rows.is_empty() => ListState::Empty,
            Ok(page) => ListState::Populated {
                rows: page.rows,
                pagination: page.pagination,
            },
            Err(e) => ListState::Error(e.user_message()),
        };
        true
    }

    /// `request` + `run` + `apply` per i casi senza concorrenza
    pub async fn load(&mut self, change: QueryChange) -> bool {
        let pending = self.request(change);
        let outcome = pending.run().await;
        self.apply(outcome)
    }

    pub async fn reload(&mut self) -> bool {
        let pending = self.refresh();
        let outcome = pending.run().await;
        self.apply(outcome)
    }
}
