//! Export, event ingestion and identity tools.

use super::schema::{distinct_id, from_date, limit, string, string_list, to_date, tracked_event, where_clause};
use crate::mcp::registry::ToolSpec;
use crate::mixpanel::export::ExportParams;
use crate::mixpanel::identity::{CreateAliasParams, CreateIdentityParams, MergeIdentitiesParams};
use crate::mixpanel::ingestion::{ImportEventsParams, TrackEventParams, TrackEventsParams};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        tool! {
            name: "export_events",
            description: "Export raw events for a date range.",
            params: ExportParams => export_events,
            schema: {
                "type": "object",
                "properties": {
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "event": string_list("Only export these events"),
                    "where": where_clause(),
                    "limit": limit()
                },
                "required": ["fromDate", "toDate"]
            },
        },
        tool! {
            name: "track_event",
            description: "Track one event. Requires the project token.",
            params: TrackEventParams => track_event,
            schema: (tracked_event()),
        },
        tool! {
            name: "track_events",
            description: "Track up to 50 events in one request. Requires the project token.",
            params: TrackEventsParams => track_events,
            schema: {
                "type": "object",
                "properties": {
                    "events": {
                        "type": "array",
                        "items": tracked_event(),
                        "minItems": 1,
                        "maxItems": 50
                    }
                },
                "required": ["events"]
            },
        },
        tool! {
            name: "import_events",
            description: "Import up to 2000 historical events. Each event needs time and distinctId.",
            params: ImportEventsParams => import_events,
            schema: {
                "type": "object",
                "properties": {
                    "events": {
                        "type": "array",
                        "items": tracked_event(),
                        "minItems": 1,
                        "maxItems": 2000
                    }
                },
                "required": ["events"]
            },
        },
        tool! {
            name: "create_identity",
            description: "Link an anonymous id to a known user id ($identify). Requires the project token.",
            params: CreateIdentityParams => create_identity,
            schema: {
                "type": "object",
                "properties": {
                    "identifiedId": string("Known user id"),
                    "anonId": string("Anonymous id to link")
                },
                "required": ["identifiedId", "anonId"]
            },
        },
        tool! {
            name: "create_alias",
            description: "Create an alias for a distinct id ($create_alias). Requires the project token.",
            params: CreateAliasParams => create_alias,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "alias": string("New alias")
                },
                "required": ["distinctId", "alias"]
            },
        },
        tool! {
            name: "merge_identities",
            description: "Merge two distinct ids into one user ($merge). Requires the project token.",
            params: MergeIdentitiesParams => merge_identities,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId1": distinct_id(),
                    "distinctId2": distinct_id()
                },
                "required": ["distinctId1", "distinctId2"]
            },
        },
    ]
}
