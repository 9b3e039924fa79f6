//! The account-request dispatcher.

use tracing::{debug, warn};

use warden_core::{AccountRequest, AttrScope, EntryType, FilterType, ReqStatus};
use warden_directory::filter;

use crate::conn;
use crate::context::ProviderContext;
use crate::error::IdResult;

/// Serve one account lookup, returning the completion for the front-end.
///
/// Requests arriving inside an offline window complete with `RetryLater`
/// without touching the network. Transport failures flip the backend
/// offline before the completion is reported.
pub async fn handle_account_info(
    ctx: &ProviderContext,
    req: &AccountRequest,
) -> (ReqStatus, String) {
    if ctx.online().is_offline() {
        return (ReqStatus::RetryLater, "Offline".to_owned());
    }

    if let Err(message) = validate(req) {
        return (ReqStatus::InvalidRequest, message);
    }

    // On-demand enumeration is refused; the scheduler owns bulk fetches.
    if matches!(req.entry_type, EntryType::User | EntryType::Group) && req.filter_value == "*" {
        return (ReqStatus::Ok, "Success".to_owned());
    }

    match run(ctx, req).await {
        Ok(()) => (ReqStatus::Ok, "Success".to_owned()),
        Err(err) => {
            if err.is_transport() {
                ctx.online().mark_offline();
            }
            warn!(error = %err, entry = ?req.entry_type, "account request failed");
            (err.status(), err.to_string())
        },
    }
}

/// Payload checks that need no I/O.
fn validate(req: &AccountRequest) -> Result<(), String> {
    match req.entry_type {
        EntryType::User | EntryType::Group => Ok(()),
        EntryType::InitGroups => {
            if req.filter_type != FilterType::Name {
                return Err("Invalid filter type".to_owned());
            }
            if req.attr_scope != AttrScope::Core {
                return Err("Invalid attr scope".to_owned());
            }
            if req.filter_value.contains('*') {
                return Err("Invalid filter value".to_owned());
            }
            Ok(())
        },
    }
}

async fn run(ctx: &ProviderContext, req: &AccountRequest) -> IdResult<()> {
    let session = conn::ensure_connected(ctx).await?;
    let dir = &ctx.config().directory;

    match req.entry_type {
        EntryType::User => {
            let filter = match req.filter_type {
                FilterType::Name => filter::user_by_name(&dir.user_map, &req.filter_value),
                FilterType::IdNum => filter::user_by_id(&dir.user_map, &req.filter_value),
            };
            let attrs = dir.user_map.requested_attrs();
            let outcome = session.search_users(&filter, &attrs).await?;
            debug!(matches = outcome.entries.len(), "user lookup complete");
            ctx.store().upsert_users(outcome.entries).await?;
        },
        EntryType::Group => {
            let filter = match req.filter_type {
                FilterType::Name => filter::group_by_name(&dir.group_map, &req.filter_value),
                FilterType::IdNum => filter::group_by_id(&dir.group_map, &req.filter_value),
            };
            let attrs = dir.group_map.requested_attrs();
            let outcome = session.search_groups(&filter, &attrs).await?;
            debug!(matches = outcome.entries.len(), "group lookup complete");
            ctx.store().upsert_groups(outcome.entries).await?;
        },
        EntryType::InitGroups => {
            let result = session
                .init_groups(
                    &req.filter_value,
                    &dir.user_map.requested_attrs(),
                    &dir.group_map.requested_attrs(),
                )
                .await?;
            debug!(
                user = %req.filter_value,
                groups = result.groups.len(),
                "initgroups resolution complete"
            );
            ctx.store().upsert_initgroups(result.user, result.groups).await?;
        },
    }
    Ok(())
}
