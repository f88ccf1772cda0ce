use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EffectiveTableConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{Permission, RequestContext};
use crate::permissions::{permissions_for, record_scope, Action, CrudPermissions, RecordScope};
use crate::rpc::{Filters, MutationOp, Record, RpcClient};
use crate::table::{present, render_cell, ActionGate, TableState, TableView};

use super::spec::ResourceSpec;
use super::state::ViewState;
use super::tracker::ViewTracker;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListOutcome {
    pub title: String,
    pub capabilities: CrudPermissions,
    pub view: ViewState<TableView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailField {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub fields: Vec<DetailField>,
    pub record: Record,
    pub capabilities: CrudPermissions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetailOutcome {
    /// Navigate away instead of rendering anything.
    Redirect { to: String },
    View { view: ViewState<DetailView> },
}

/// Navigation targets for callers that are signed out or lack a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirects {
    pub forbidden: String,
    pub login: String,
}

impl Default for Redirects {
    fn default() -> Self {
        Self { forbidden: "/".to_string(), login: "/login".to_string() }
    }
}

/// One controller type for every entity; the `ResourceSpec` carries the differences.
/// Capabilities are always resolved before any query is issued.
pub struct ResourceController<C: RpcClient + ?Sized> {
    spec: ResourceSpec,
    client: Arc<C>,
    table: EffectiveTableConfig,
    redirects: Redirects,
}

fn unauthenticated() -> AppError {
    AppError::unauthenticated("no_session", "sign in to continue")
}

impl<C: RpcClient + ?Sized> ResourceController<C> {
    pub fn new(spec: ResourceSpec, client: Arc<C>, table: EffectiveTableConfig) -> Self {
        Self { spec, client, table, redirects: Redirects::default() }
    }

    pub fn with_redirects(mut self, redirects: Redirects) -> Self {
        self.redirects = redirects;
        self
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub fn permissions(&self, ctx: &RequestContext) -> CrudPermissions {
        permissions_for(ctx.permission.as_ref(), self.spec.resource)
    }

    fn gate<'a>(&self, ctx: &'a RequestContext) -> AppResult<(&'a Permission, ActionGate)> {
        let permission = ctx.permission.as_ref().ok_or_else(unauthenticated)?;
        Ok((permission, ActionGate::new(self.spec.resource, self.permissions(ctx))))
    }

    fn scope_filters(&self, permission: &Permission) -> Filters {
        match record_scope(permission.role, self.spec.resource) {
            RecordScope::All => Filters::new(),
            RecordScope::Owned { field } => Filters::new().eq(field, permission.id.clone()),
        }
    }

    pub async fn list(&self, ctx: &RequestContext, state: &TableState) -> AppResult<ListOutcome> {
        let (permission, gate) = self.gate(ctx)?;
        gate.ensure(Action::List)?;
        let caps = gate.capabilities();
        let filters = self.scope_filters(permission);
        let view = match self.client.query(self.spec.resource, &filters).await {
            Ok(rows) if rows.is_empty() => ViewState::Empty,
            Ok(rows) => ViewState::Populated(present(Some(rows.as_slice()), &self.spec.table, &caps, state, &self.table, false)),
            Err(e) => {
                let err = AppError::from(e);
                info!(target: "view", "list {} failed: {}", self.spec.resource, err);
                ViewState::error(&err)
            }
        };
        Ok(ListOutcome { title: self.spec.title.clone(), capabilities: caps, view })
    }

    /// Run `list` under a tracker ticket; the result lands only if no newer fetch started meanwhile.
    /// A refused list still leaves the view in a terminal `Error` state.
    pub async fn list_tracked(&self, ctx: &RequestContext, state: &TableState, tracker: &ViewTracker<TableView>) -> AppResult<bool> {
        let ticket = tracker.begin();
        match self.list(ctx, state).await {
            Ok(outcome) => Ok(tracker.commit(ticket, outcome.view)),
            Err(err) => {
                tracker.commit(ticket, ViewState::error(&err));
                Err(err)
            }
        }
    }

    pub async fn detail(&self, ctx: &RequestContext, id: &str) -> AppResult<DetailOutcome> {
        let Some(permission) = ctx.permission.as_ref() else {
            return Ok(DetailOutcome::Redirect { to: self.redirects.login.clone() });
        };
        let caps = self.permissions(ctx);
        if !caps.can_details {
            debug!(target: "view", "user={} lacks details on {}; redirecting", permission.id, self.spec.resource);
            return Ok(DetailOutcome::Redirect { to: self.redirects.forbidden.clone() });
        }
        let filters = self.scope_filters(permission).eq("id", id.to_string());
        let rows = match self.client.query(self.spec.resource, &filters).await {
            Ok(rows) => rows,
            Err(e) => {
                let err = AppError::from(e);
                info!(target: "view", "detail {}/{} failed: {}", self.spec.resource, id, err);
                return Ok(DetailOutcome::View { view: ViewState::error(&err) });
            }
        };
        let Some(record) = rows.into_iter().next() else {
            return Err(AppError::not_found("record_not_found".to_string(), format!("{} '{}' not found", self.spec.resource, id)));
        };
        let fields = self
            .spec
            .detail_fields
            .iter()
            .map(|c| DetailField { key: c.key.clone(), label: c.header.clone(), value: render_cell(&record, &c.key) })
            .collect();
        Ok(DetailOutcome::View {
            view: ViewState::Populated(DetailView { id: id.to_string(), title: self.spec.title.clone(), fields, record, capabilities: caps }),
        })
    }

    /// For owned scopes, a record outside the caller's scope is reported as missing.
    async fn ensure_in_scope(&self, permission: &Permission, id: &str) -> AppResult<()> {
        let filters = self.scope_filters(permission);
        if filters.is_empty() { return Ok(()); }
        let rows = self.client.query(self.spec.resource, &filters.eq("id", id.to_string())).await?;
        if rows.is_empty() {
            return Err(AppError::not_found("record_not_found".to_string(), format!("{} '{}' not found", self.spec.resource, id)));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &RequestContext, mut payload: Record) -> AppResult<Record> {
        let (permission, gate) = self.gate(ctx)?;
        gate.ensure(Action::Add)?;
        if let RecordScope::Owned { field } = record_scope(permission.role, self.spec.resource) {
            payload.insert(field, Value::String(permission.id.clone()));
        }
        Ok(self.client.mutate(self.spec.resource, MutationOp::Create, payload).await?)
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, payload: Record) -> AppResult<Record> {
        let (permission, gate) = self.gate(ctx)?;
        gate.ensure(Action::Edit)?;
        self.ensure_in_scope(permission, id).await?;
        Ok(self.client.mutate(self.spec.resource, MutationOp::Update { id: id.to_string() }, payload).await?)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> AppResult<Record> {
        let (permission, gate) = self.gate(ctx)?;
        gate.ensure(Action::Delete)?;
        self.ensure_in_scope(permission, id).await?;
        Ok(self.client.mutate(self.spec.resource, MutationOp::Delete { id: id.to_string() }, Record::new()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{CurrentUser, Role};
    use crate::permissions::Resource;
    use crate::rpc::InMemoryRpc;
    use crate::view::registry::resource_spec;
    use serde_json::json;

    fn ctx(role: Role, id: &str) -> RequestContext {
        RequestContext::authenticated(CurrentUser { id: id.into(), display_name: id.into() }, Permission::new(id, role))
    }

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    async fn controller(resource: Resource) -> (Arc<InMemoryRpc>, ResourceController<InMemoryRpc>) {
        let rpc = Arc::new(InMemoryRpc::new());
        rpc.insert_all(Resource::Projects, vec![
            rec(json!({"id": "p1", "title": "Garden", "member_id": "m1"})),
            rec(json!({"id": "p2", "title": "Bakery", "member_id": "m2"})),
        ])
        .await;
        rpc.insert_all(Resource::Classes, vec![rec(json!({"id": "c1", "name": "CAP 1"}))]).await;
        let c = ResourceController::new(resource_spec(resource), rpc.clone(), EffectiveTableConfig::default());
        (rpc, c)
    }

    #[tokio::test]
    async fn member_sees_only_owned_projects() {
        let (_rpc, c) = controller(Resource::Projects).await;
        let out = c.list(&ctx(Role::Member, "m1"), &TableState::default()).await.unwrap();
        let table = out.view.populated().unwrap();
        assert_eq!(table.filtered, 1);
        assert_eq!(table.rows()[0].id.as_deref(), Some("p1"));
        assert!(!table.show_add);

        let other = c.detail(&ctx(Role::Member, "m1"), "p2").await.unwrap_err();
        assert_eq!(other.http_status(), 404);
    }

    #[tokio::test]
    async fn member_class_detail_redirects_home_without_querying() {
        let (rpc, c) = controller(Resource::Classes).await;
        rpc.fail_next(1);
        let out = c.detail(&ctx(Role::Member, "m1"), "c1").await.unwrap();
        assert_eq!(out, DetailOutcome::Redirect { to: "/".into() });
        // the injected failure was not consumed: no query was issued
        assert!(rpc.query(Resource::Classes, &Filters::new()).await.is_err());
    }

    #[tokio::test]
    async fn guest_is_sent_to_login_or_refused() {
        let (_rpc, c) = controller(Resource::Classes).await;
        let guest = RequestContext::guest();
        assert_eq!(c.detail(&guest, "c1").await.unwrap(), DetailOutcome::Redirect { to: "/login".into() });
        assert_eq!(c.list(&guest, &TableState::default()).await.unwrap_err().http_status(), 401);
        assert_eq!(c.permissions(&guest), CrudPermissions::none());
    }

    #[tokio::test]
    async fn transport_failure_is_an_inline_retryable_state() {
        let (rpc, c) = controller(Resource::Projects).await;
        rpc.fail_next(1);
        let out = c.list(&ctx(Role::Admin, "a"), &TableState::default()).await.unwrap();
        assert!(matches!(out.view, ViewState::Error { retryable: true, .. }));
        let again = c.list(&ctx(Role::Admin, "a"), &TableState::default()).await.unwrap();
        assert!(again.view.populated().is_some());
    }

    #[tokio::test]
    async fn mutations_are_gated_at_trigger_time() {
        let (rpc, c) = controller(Resource::Projects).await;
        let trainer = ctx(Role::Trainer, "t1");
        let err = c.delete(&trainer, "p1").await.unwrap_err();
        assert_eq!(err.code_str(), "action_not_permitted");
        assert_eq!(rpc.count(Resource::Projects).await, 2);

        let admin = ctx(Role::Admin, "a");
        let created = c.create(&admin, rec(json!({"title": "Forge"}))).await.unwrap();
        assert!(created.contains_key("id"));
        c.delete(&admin, "p1").await.unwrap();
        assert_eq!(rpc.count(Resource::Projects).await, 2);
    }

    #[tokio::test]
    async fn refused_tracked_list_ends_in_error_state() {
        let (_rpc, c) = controller(Resource::Classes).await;
        let tracker: ViewTracker<TableView> = ViewTracker::new();
        let t = tracker.begin();
        assert!(tracker.commit(t, ViewState::Empty));

        let err = c.list_tracked(&ctx(Role::Member, "m1"), &TableState::default(), &tracker).await.unwrap_err();
        assert_eq!(err.code_str(), "action_not_permitted");
        assert!(matches!(tracker.current(), ViewState::Error { ref code, retryable: false, .. } if code == "action_not_permitted"));

        let err = c.list_tracked(&RequestContext::guest(), &TableState::default(), &tracker).await.unwrap_err();
        assert_eq!(err.http_status(), 401);
        assert!(tracker.current().is_terminal());
    }

    #[tokio::test]
    async fn detail_renders_configured_fields() {
        let (_rpc, c) = controller(Resource::Projects).await;
        let out = c.detail(&ctx(Role::Supervisor, "s"), "p2").await.unwrap();
        let DetailOutcome::View { view: ViewState::Populated(d) } = out else { panic!("expected a populated detail view") };
        assert_eq!(d.fields[0].label, "Title");
        assert_eq!(d.fields[0].value, "Bakery");
        assert!(d.capabilities.can_edit && !d.capabilities.can_delete);
    }
}
