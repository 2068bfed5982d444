use async_graphql::{Context, ErrorExtensions};

use crate::{app_state::AppState, errors::AppResult};

pub fn app_state<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a AppState> {
    ctx.data::<AppState>()
}

/// Converts a service result, keeping the error code as an extension.
pub fn into_graphql<T>(result: AppResult<T>) -> async_graphql::Result<T> {
    result.map_err(|err| err.extend())
}
