//! Event analytics tools.

use super::schema::{
    count_type, event_name, from_date, limit, on_expression, positive, string, string_list,
    to_date, unit, where_clause,
};
use crate::mcp::registry::ToolSpec;
use crate::mixpanel::query::{
    ActivityStreamParams, EventPropertiesParams, InsightsParams, JqlParams, NumericAggregateParams,
    NumericSegmentationParams, SavedReportParams, SegmentationParams, TopEventsParams,
    TopPropertiesParams, TopPropertyValuesParams,
};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        tool! {
            name: "query_insights",
            description: "Get event counts over a date range for one or more events.",
            params: InsightsParams => query_insights,
            schema: {
                "type": "object",
                "properties": {
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "event": {
                        "description": "Event name or list of event names",
                        "oneOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" }, "minItems": 1 }
                        ]
                    },
                    "type": count_type(),
                    "unit": unit("Time bucket")
                },
                "required": ["fromDate", "toDate", "event"]
            },
        },
        tool! {
            name: "query_saved_report",
            description: "Run a saved Insights report by its bookmark id.",
            params: SavedReportParams => query_saved_report,
            schema: {
                "type": "object",
                "properties": {
                    "bookmarkId": positive("Saved report (bookmark) id")
                },
                "required": ["bookmarkId"]
            },
        },
        tool! {
            name: "query_segmentation",
            description: "Segment an event over time, optionally by a property expression.",
            params: SegmentationParams => query_segmentation,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "on": on_expression(),
                    "unit": unit("Time bucket"),
                    "interval": positive("Number of days per bucket; overrides unit"),
                    "where": where_clause(),
                    "limit": limit(),
                    "type": count_type()
                },
                "required": ["event", "fromDate", "toDate"]
            },
        },
        tool! {
            name: "query_segmentation_numeric",
            description: "Segment an event into numeric buckets of a property expression.",
            params: NumericSegmentationParams => query_segmentation_numeric,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "on": string("Numeric property expression to bucket by"),
                    "unit": unit("Time bucket"),
                    "where": where_clause(),
                    "type": count_type()
                },
                "required": ["event", "fromDate", "toDate", "on"]
            },
        },
        tool! {
            name: "query_segmentation_sum",
            description: "Sum a numeric property expression for an event per time bucket.",
            params: NumericAggregateParams => query_segmentation_sum,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "on": string("Numeric property expression to sum"),
                    "unit": unit("Time bucket"),
                    "where": where_clause()
                },
                "required": ["event", "fromDate", "toDate", "on"]
            },
        },
        tool! {
            name: "query_segmentation_average",
            description: "Average a numeric property expression for an event per time bucket.",
            params: NumericAggregateParams => query_segmentation_average,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "on": string("Numeric property expression to average"),
                    "unit": unit("Time bucket"),
                    "where": where_clause()
                },
                "required": ["event", "fromDate", "toDate", "on"]
            },
        },
        tool! {
            name: "query_event_properties",
            description: "Break down an event by the values of one of its properties.",
            params: EventPropertiesParams => query_event_properties,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "name": string("Property name"),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "values": string_list("Restrict to these property values"),
                    "type": count_type(),
                    "unit": unit("Time bucket"),
                    "limit": limit()
                },
                "required": ["event", "name", "fromDate", "toDate"]
            },
        },
        tool! {
            name: "list_top_events",
            description: "List today's most common events.",
            params: TopEventsParams => list_top_events,
            schema: {
                "type": "object",
                "properties": {
                    "type": count_type(),
                    "limit": limit()
                }
            },
        },
        tool! {
            name: "list_event_names",
            description: "List the most common event names over the last 31 days.",
            params: TopEventsParams => list_event_names,
            schema: {
                "type": "object",
                "properties": {
                    "type": count_type(),
                    "limit": limit()
                }
            },
        },
        tool! {
            name: "list_top_event_properties",
            description: "List the most common properties for an event.",
            params: TopPropertiesParams => list_top_event_properties,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "limit": limit()
                },
                "required": ["event"]
            },
        },
        tool! {
            name: "list_top_property_values",
            description: "List the most common values of an event property.",
            params: TopPropertyValuesParams => list_top_property_values,
            schema: {
                "type": "object",
                "properties": {
                    "event": event_name(),
                    "name": string("Property name"),
                    "limit": limit()
                },
                "required": ["event", "name"]
            },
        },
        tool! {
            name: "query_activity_stream",
            description: "Get the event activity feed for specific users.",
            params: ActivityStreamParams => query_activity_stream,
            schema: {
                "type": "object",
                "properties": {
                    "distinctIds": string_list("User distinct ids"),
                    "fromDate": from_date(),
                    "toDate": to_date()
                },
                "required": ["distinctIds", "fromDate", "toDate"]
            },
        },
        tool! {
            name: "query_jql",
            description: "Run a JQL (JavaScript Query Language) script.",
            params: JqlParams => query_jql,
            schema: {
                "type": "object",
                "properties": {
                    "script": string("JQL script source"),
                    "params": {
                        "type": "object",
                        "description": "Values exposed to the script as `params`"
                    }
                },
                "required": ["script"]
            },
        },
    ]
}
