//! HTTP listener

use axum::Router;

use crate::prelude::*;

pub async fn serve(listen: &str, router: Router) -> ClResult<()> {
	let listener = tokio::net::TcpListener::bind(listen).await.map_err(|e| {
		error!("FATAL: Cannot listen on {}: {}", listen, e);
		e
	})?;
	info!("Listening on HTTP {}", listener.local_addr()?);

	axum::serve(listener, router).await?;
	Ok(())
}

// vim: ts=4
