use std::sync::Arc;

use spantopo_core::config::AnalysisConfig;
use spantopo_core::consts::{NONE, USER_ENDPOINT_ID, USER_INSTANCE_ID, USER_SERVICE_ID};
use spantopo_core::error::{Result, SpantopoError};
use spantopo_core::inventory::{
    EndpointInventory, InstanceEntry, InstanceInventory, ServiceEntry, ServiceInventory,
};
use spantopo_core::model::database::DatabaseSlowStatement;
use spantopo_core::model::{DetectPoint, Record, RequestType};
use spantopo_core::segment::{SegmentInfo, SpanLayer, SpanView};
use spantopo_core::sink::RecordSink;
use tracing::debug;

use crate::builder::SourceBuilder;
use crate::slow;

/// Event kinds a listener can declare interest in. The external dispatcher
/// checks interest once per segment and skips uninterested listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Entry,
    Exit,
    GlobalTraceIds,
}

/// One span/segment event delivered by the external decoding stage.
#[derive(Debug, Clone)]
pub enum SegmentEvent<'a> {
    Entry(&'a SpanView),
    Exit(&'a SpanView),
    GlobalTraceIds(&'a [String]),
}

impl SegmentEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            SegmentEvent::Entry(_) => EventKind::Entry,
            SegmentEvent::Exit(_) => EventKind::Exit,
            SegmentEvent::GlobalTraceIds(_) => EventKind::GlobalTraceIds,
        }
    }
}

/// Per-segment analysis state machine. Events are delivered strictly
/// sequentially, then `finish` emits the accumulated records in one pass.
pub trait SpanListener {
    fn accepts(&self, kind: EventKind) -> bool;

    fn notify(&mut self, event: &SegmentEvent<'_>, segment: &SegmentInfo) -> Result<()>;

    /// Terminal transition; call exactly once, after all spans were visited.
    fn finish(&mut self) -> Result<()>;
}

/// Creates one listener per segment-processing invocation.
pub trait SpanListenerFactory: Send + Sync {
    fn create(&self) -> Box<dyn SpanListener>;
}

/// Converts one trace segment into topology relation and metric records.
///
/// Entry spans become server-side edges (caller resolved from cross-process
/// references, or the synthetic external user when there are none), exit
/// spans become client-side edges keyed by peer address, and database exit
/// spans additionally feed slow-statement detection.
pub struct TopologyAnalysisListener {
    services: Arc<dyn ServiceInventory>,
    instances: Arc<dyn InstanceInventory>,
    endpoints: Arc<dyn EndpointInventory>,
    sink: Arc<dyn RecordSink>,
    config: AnalysisConfig,
    entry_builders: Vec<SourceBuilder>,
    exit_builders: Vec<SourceBuilder>,
    slow_statements: Vec<DatabaseSlowStatement>,
    entry_span: Option<SpanView>,
    minute_time_bucket: i64,
    trace_id: Option<String>,
}

impl TopologyAnalysisListener {
    pub fn new(
        services: Arc<dyn ServiceInventory>,
        instances: Arc<dyn InstanceInventory>,
        endpoints: Arc<dyn EndpointInventory>,
        sink: Arc<dyn RecordSink>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            services,
            instances,
            endpoints,
            sink,
            config,
            entry_builders: Vec::new(),
            exit_builders: Vec::new(),
            slow_statements: Vec::new(),
            entry_span: None,
            minute_time_bucket: 0,
            trace_id: None,
        }
    }

    fn handle_entry(&mut self, span: &SpanView, segment: &SegmentInfo) -> Result<()> {
        self.minute_time_bucket = segment.minute_time_bucket();

        if span.refs.is_empty() {
            // No caller on record: an externally-initiated request.
            let mut builder = SourceBuilder::new(DetectPoint::Server);
            builder.source_endpoint_id = USER_ENDPOINT_ID;
            builder.source_service_instance_id = USER_INSTANCE_ID;
            builder.source_service_id = USER_SERVICE_ID;
            builder.dest_endpoint_id = span.operation_id;
            builder.dest_service_instance_id = segment.service_instance_id;
            builder.dest_service_id = segment.service_id;
            builder.component_id = span.component_id;
            self.fill_common(&mut builder, span)?;
            self.entry_builders.push(builder);
        } else {
            for reference in &span.refs {
                let mut builder = SourceBuilder::new(DetectPoint::Server);
                builder.source_endpoint_id = reference.parent_endpoint_id;

                if span.layer == SpanLayer::Mq {
                    // Producer and consumer are decoupled by the queue, so
                    // the source is whoever owns the queue's network
                    // address, not the literal parent of the reference.
                    let service_id =
                        self.service_id_by_address(reference.network_address_id)?;
                    let instance_id =
                        self.instance_id_by_address(service_id, reference.network_address_id)?;
                    builder.source_service_instance_id = instance_id;
                    builder.source_service_id = service_id;
                } else {
                    builder.source_service_instance_id = reference.parent_service_instance_id;
                    builder.source_service_id = self
                        .instance_entry(reference.parent_service_instance_id)?
                        .service_id;
                }

                builder.dest_endpoint_id = span.operation_id;
                builder.dest_service_instance_id = segment.service_instance_id;
                builder.dest_service_id = segment.service_id;
                builder.component_id = span.component_id;
                self.fill_common(&mut builder, span)?;
                self.entry_builders.push(builder);
            }
        }

        // Remembered so exit edges can be stitched to this segment's own
        // inbound endpoint at finalize time.
        self.entry_span = Some(span.clone());
        Ok(())
    }

    fn handle_exit(&mut self, span: &SpanView, segment: &SegmentInfo) -> Result<()> {
        if self.minute_time_bucket == 0 {
            self.minute_time_bucket = segment.minute_time_bucket();
        }

        if span.peer_id == NONE {
            debug!(
                segment_id = %segment.segment_id,
                span_id = span.span_id,
                "exit span without peer, skipping"
            );
            return Ok(());
        }

        let dest_service_id = self.service_id_by_address(span.peer_id)?;
        let mapping_service_id = self.service_entry(dest_service_id)?.mapping_service_id;
        let dest_instance_id = self.instance_id_by_address(dest_service_id, span.peer_id)?;

        let mut builder = SourceBuilder::new(DetectPoint::Client);
        // Placeholder; the real source endpoint is only known once the
        // segment's entry span has been seen, so it is stitched at finalize.
        builder.source_endpoint_id = USER_ENDPOINT_ID;
        builder.source_service_instance_id = segment.service_instance_id;
        builder.source_service_id = segment.service_id;
        builder.dest_endpoint_id = span.operation_id;
        builder.dest_service_instance_id = dest_instance_id;
        builder.dest_service_id = if mapping_service_id == NONE {
            dest_service_id
        } else {
            mapping_service_id
        };
        builder.component_id = span.component_id;
        self.fill_common(&mut builder, span)?;

        if builder.request_type == RequestType::Database {
            if let Some(statement) = slow::detect(
                span,
                &self.config,
                builder.dest_service_id,
                builder.latency_ms,
                &segment.segment_id,
                self.trace_id.clone(),
            ) {
                debug!(id = %statement.id, latency_ms = statement.latency_ms, "slow database access");
                self.slow_statements.push(statement);
            }
        }

        self.exit_builders.push(builder);
        Ok(())
    }

    fn handle_trace_ids(&mut self, parts: &[String]) {
        // First event wins; later ones are no-ops.
        if self.trace_id.is_none() {
            self.trace_id = Some(parts.join("."));
        }
    }

    /// Attributes shared by entry and exit edges. Negative latency from
    /// skewed clocks passes through unmodified.
    fn fill_common(&self, builder: &mut SourceBuilder, span: &SpanView) -> Result<()> {
        builder.latency_ms = span.end_time_ms - span.start_time_ms;
        builder.status = !span.is_error;
        builder.response_code = NONE;
        builder.request_type = match span.layer {
            SpanLayer::Http => RequestType::Http,
            SpanLayer::Database => RequestType::Database,
            _ => RequestType::Rpc,
        };

        builder.source_service_name = self.service_entry(builder.source_service_id)?.name;
        builder.source_service_instance_name =
            self.instance_entry(builder.source_service_instance_id)?.name;
        if builder.source_endpoint_id != NONE {
            builder.source_endpoint_name = self.endpoint_name(builder.source_endpoint_id)?;
        }
        builder.dest_service_name = self.service_entry(builder.dest_service_id)?.name;
        builder.dest_service_instance_name =
            self.instance_entry(builder.dest_service_instance_id)?.name;
        builder.dest_endpoint_name = self.endpoint_name(builder.dest_endpoint_id)?;
        Ok(())
    }

    fn service_entry(&self, service_id: i32) -> Result<ServiceEntry> {
        self.services.get(service_id).ok_or_else(|| {
            SpantopoError::Lookup(format!("service {service_id} is not registered"))
        })
    }

    fn instance_entry(&self, instance_id: i32) -> Result<InstanceEntry> {
        self.instances.get(instance_id).ok_or_else(|| {
            SpantopoError::Lookup(format!("service instance {instance_id} is not registered"))
        })
    }

    fn endpoint_name(&self, endpoint_id: i32) -> Result<String> {
        self.endpoints
            .get(endpoint_id)
            .map(|entry| entry.name)
            .ok_or_else(|| {
                SpantopoError::Lookup(format!("endpoint {endpoint_id} is not registered"))
            })
    }

    fn service_id_by_address(&self, address_id: i32) -> Result<i32> {
        self.services.service_id_by_address(address_id).ok_or_else(|| {
            SpantopoError::Lookup(format!("no service registered for address {address_id}"))
        })
    }

    fn instance_id_by_address(&self, service_id: i32, address_id: i32) -> Result<i32> {
        self.instances
            .instance_id_by_address(service_id, address_id)
            .ok_or_else(|| {
                SpantopoError::Lookup(format!(
                    "no instance of service {service_id} registered for address {address_id}"
                ))
            })
    }
}

impl SpanListener for TopologyAnalysisListener {
    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::Entry | EventKind::Exit | EventKind::GlobalTraceIds
        )
    }

    fn notify(&mut self, event: &SegmentEvent<'_>, segment: &SegmentInfo) -> Result<()> {
        match event {
            SegmentEvent::Entry(span) => self.handle_entry(span, segment),
            SegmentEvent::Exit(span) => self.handle_exit(span, segment),
            SegmentEvent::GlobalTraceIds(parts) => {
                self.handle_trace_ids(parts);
                Ok(())
            }
        }
    }

    /// Emission order is fixed: per entry edge all/service/instance/endpoint
    /// traffic then service/instance relations then the optional endpoint
    /// relation; per exit edge service/instance relations plus database
    /// access for database calls; queued slow statements last. A sink error
    /// aborts whatever remains.
    ///
    /// If no entry span was seen before finalize (the decoding stage does
    /// not guarantee entry-before-exit ordering), exit edges fall back to
    /// the external-user endpoint even when a real parent exists upstream.
    fn finish(&mut self) -> Result<()> {
        let time_bucket = self.minute_time_bucket;

        for mut builder in std::mem::take(&mut self.entry_builders) {
            builder.time_bucket = time_bucket;
            self.sink.receive(Record::All(builder.all_traffic()))?;
            self.sink.receive(Record::Service(builder.service_traffic()))?;
            self.sink
                .receive(Record::ServiceInstance(builder.instance_traffic()))?;
            self.sink.receive(Record::Endpoint(builder.endpoint_traffic()))?;
            self.sink
                .receive(Record::ServiceRelation(builder.service_relation()))?;
            self.sink
                .receive(Record::ServiceInstanceRelation(builder.instance_relation()))?;
            if let Some(relation) = builder.endpoint_relation() {
                self.sink.receive(Record::EndpointRelation(relation))?;
            }
        }

        for mut builder in std::mem::take(&mut self.exit_builders) {
            builder.source_endpoint_id = match &self.entry_span {
                Some(entry) => entry.operation_id,
                None => USER_ENDPOINT_ID,
            };
            builder.source_endpoint_name = self.endpoint_name(builder.source_endpoint_id)?;
            builder.time_bucket = time_bucket;
            self.sink
                .receive(Record::ServiceRelation(builder.service_relation()))?;
            self.sink
                .receive(Record::ServiceInstanceRelation(builder.instance_relation()))?;
            if builder.request_type == RequestType::Database {
                self.sink
                    .receive(Record::DatabaseAccess(builder.database_access()))?;
            }
        }

        for statement in std::mem::take(&mut self.slow_statements) {
            self.sink.receive(Record::DatabaseSlowStatement(statement))?;
        }

        Ok(())
    }
}

/// Factory wired once at pipeline-bootstrap time with the shared caches,
/// the sink, and the analysis configuration.
pub struct TopologyAnalysisListenerFactory {
    services: Arc<dyn ServiceInventory>,
    instances: Arc<dyn InstanceInventory>,
    endpoints: Arc<dyn EndpointInventory>,
    sink: Arc<dyn RecordSink>,
    config: AnalysisConfig,
}

impl TopologyAnalysisListenerFactory {
    pub fn new(
        services: Arc<dyn ServiceInventory>,
        instances: Arc<dyn InstanceInventory>,
        endpoints: Arc<dyn EndpointInventory>,
        sink: Arc<dyn RecordSink>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            services,
            instances,
            endpoints,
            sink,
            config,
        }
    }
}

impl SpanListenerFactory for TopologyAnalysisListenerFactory {
    fn create(&self) -> Box<dyn SpanListener> {
        Box::new(TopologyAnalysisListener::new(
            Arc::clone(&self.services),
            Arc::clone(&self.instances),
            Arc::clone(&self.endpoints),
            Arc::clone(&self.sink),
            self.config.clone(),
        ))
    }
}
