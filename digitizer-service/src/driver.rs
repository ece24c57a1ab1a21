//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::projection::{EditorUi, FeatureTable, MapView};
use crate::sync::{Outgoing, RequestId, SyncCoordinator};
use digitizer_core::core::error::{SyncError, SyncResult};
use digitizer_core::core::feature::{FeatureId, Properties};
use digitizer_core::core::geom::Geometry;
use digitizer_core::datasource::Transport;
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError};
use viewport_diff::Extent;

/// User interaction or map event
#[derive(Clone, Debug)]
pub enum EditorEvent {
    ViewportChanged(Extent),
    SelectSchema(String),
    Refresh(String),
    Enable,
    Disable,
    DrawCompleted {
        schema: String,
        geometry: Geometry,
    },
    GeometryModified {
        schema: String,
        id: FeatureId,
        geometry: Geometry,
    },
    Save {
        schema: String,
        id: FeatureId,
        properties: Properties,
    },
    Delete {
        schema: String,
        id: FeatureId,
    },
    ConfirmDelete {
        schema: String,
        id: FeatureId,
    },
    Export {
        schema: String,
        id: FeatureId,
        format: String,
    },
    Hover {
        schema: String,
        id: Option<FeatureId>,
    },
}

impl<M: MapView, T: FeatureTable, U: EditorUi> SyncCoordinator<M, T, U> {
    /// Dispatch an editor event
    pub fn handle(&mut self, event: EditorEvent) -> SyncResult<Vec<Outgoing>> {
        match event {
            EditorEvent::ViewportChanged(extent) => self.viewport_changed(&extent),
            EditorEvent::SelectSchema(name) => self.select_schema(&name),
            EditorEvent::Refresh(name) => self.refresh(&name),
            EditorEvent::Enable => self.enable(),
            EditorEvent::Disable => self.disable(),
            EditorEvent::DrawCompleted { schema, geometry } => {
                self.draw_completed(&schema, geometry).map(|_| Vec::new())
            }
            EditorEvent::GeometryModified {
                schema,
                id,
                geometry,
            } => self
                .geometry_modified(&schema, &id, geometry)
                .map(|_| Vec::new()),
            EditorEvent::Save {
                schema,
                id,
                properties,
            } => self.save(&schema, &id, properties),
            EditorEvent::Delete { schema, id } => self.delete(&schema, &id).map(|_| Vec::new()),
            EditorEvent::ConfirmDelete { schema, id } => self.confirm_delete(&schema, &id),
            EditorEvent::Export { schema, id, format } => self.export(&schema, &id, &format),
            EditorEvent::Hover { schema, id } => self.hover(&schema, id.as_ref()).map(|_| Vec::new()),
        }
    }
}

/// Response of a request task, `JoinError` if the task died
type Completion = (RequestId, Result<SyncResult<Value>, JoinError>);

enum Step {
    Event(Option<EditorEvent>),
    Completion(Completion),
}

/// Executes requests concurrently and feeds the responses back to the
/// coordinator one at a time, in completion order.
pub struct Driver<S: Transport + 'static> {
    transport: Arc<S>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl<S: Transport + 'static> Driver<S> {
    pub fn new(transport: Arc<S>) -> Driver<S> {
        Driver {
            transport,
            in_flight: FuturesUnordered::new(),
        }
    }
    /// Start sending requests
    pub fn dispatch(&mut self, outgoing: Vec<Outgoing>) {
        for Outgoing { id, request } in outgoing {
            let transport = self.transport.clone();
            let task = task::spawn(async move { transport.send(request).await });
            self.in_flight
                .push(task.map(move |joined| (id, joined)).boxed());
        }
    }
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn apply<M, T, U>(
        coordinator: &mut SyncCoordinator<M, T, U>,
        (id, joined): Completion,
    ) -> SyncResult<()>
    where
        M: MapView,
        T: FeatureTable,
        U: EditorUi,
    {
        let response = joined.unwrap_or_else(|err| {
            error!("Request task #{} failed: {}", id, err);
            Err(SyncError::Transport(err.to_string()))
        });
        coordinator.complete(id, response)
    }

    /// Wait for the next response and apply it. `None` if nothing is in flight.
    pub async fn complete_next<M, T, U>(
        &mut self,
        coordinator: &mut SyncCoordinator<M, T, U>,
    ) -> Option<SyncResult<()>>
    where
        M: MapView,
        T: FeatureTable,
        U: EditorUi,
    {
        let completion = self.in_flight.next().await?;
        Some(Self::apply(coordinator, completion))
    }

    /// Apply all outstanding responses. Returns the errors of failed requests.
    pub async fn run_until_idle<M, T, U>(
        &mut self,
        coordinator: &mut SyncCoordinator<M, T, U>,
    ) -> Vec<SyncError>
    where
        M: MapView,
        T: FeatureTable,
        U: EditorUi,
    {
        let mut errors = Vec::new();
        while let Some(result) = self.complete_next(coordinator).await {
            if let Err(err) = result {
                errors.push(err);
            }
        }
        errors
    }

    /// Process events until the channel is closed and all responses are applied.
    /// Returns the errors of failed events and requests.
    pub async fn run<M, T, U>(
        &mut self,
        coordinator: &mut SyncCoordinator<M, T, U>,
        mut events: mpsc::Receiver<EditorEvent>,
    ) -> Vec<SyncError>
    where
        M: MapView,
        T: FeatureTable,
        U: EditorUi,
    {
        let mut errors = Vec::new();
        let mut open = true;
        while open || !self.in_flight.is_empty() {
            let step = tokio::select! {
                event = events.recv(), if open => Step::Event(event),
                Some(completion) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    Step::Completion(completion)
                }
                else => break,
            };
            match step {
                Step::Event(Some(event)) => {
                    debug!("event {:?}", event);
                    match coordinator.handle(event) {
                        Ok(outgoing) => self.dispatch(outgoing),
                        Err(err) => {
                            warn!("{}", err);
                            errors.push(err);
                        }
                    }
                }
                Step::Event(None) => open = false,
                Step::Completion(completion) => {
                    if let Err(err) = Self::apply(coordinator, completion) {
                        errors.push(err);
                    }
                }
            }
        }
        errors
    }
}
