//! Funnel, retention, profile and cohort tools.

use super::schema::{
    boolean, distinct_id, event_name, from_date, integer, limit, object, on_expression,
    one_of_strings, output_properties, positive, string, to_date, unit, where_clause,
};
use crate::mcp::registry::ToolSpec;
use crate::mixpanel::funnels::{FrequencyParams, FunnelParams, ListFunnelsParams, RetentionParams};
use crate::mixpanel::profiles::{
    CohortMembersParams, GetProfileParams, ListCohortsParams, QueryProfilesParams,
};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        tool! {
            name: "query_funnel",
            description: "Get conversion data for a saved funnel.",
            params: FunnelParams => query_funnel,
            schema: {
                "type": "object",
                "properties": {
                    "funnelId": positive("Funnel id"),
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "length": positive("Conversion window length"),
                    "lengthUnit": unit("Unit of the conversion window"),
                    "interval": positive("Number of days per bucket"),
                    "unit": unit("Time bucket"),
                    "on": on_expression(),
                    "where": where_clause(),
                    "limit": limit()
                },
                "required": ["funnelId", "fromDate", "toDate"]
            },
        },
        tool! {
            name: "list_funnels",
            description: "List the saved funnels in the project.",
            params: ListFunnelsParams => list_funnels,
            schema: {
                "type": "object",
                "properties": {}
            },
        },
        tool! {
            name: "query_retention",
            description: "Get cohort retention: how many users come back after a first event.",
            params: RetentionParams => query_retention,
            schema: {
                "type": "object",
                "properties": {
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "retentionType": one_of_strings(
                        &["birth", "compounded"],
                        "First-time (birth) or recurring (compounded) retention"
                    ),
                    "bornEvent": string("Event that places a user in a cohort"),
                    "event": string("Event counted as a return"),
                    "bornWhere": string("Filter on the born event"),
                    "where": where_clause(),
                    "interval": positive("Days per retention bucket"),
                    "intervalCount": positive("Number of buckets"),
                    "unit": unit("Bucket unit"),
                    "on": on_expression(),
                    "limit": limit()
                },
                "required": ["fromDate", "toDate"]
            },
        },
        tool! {
            name: "query_frequency",
            description: "Get how often users perform an event within each time period.",
            params: FrequencyParams => query_frequency,
            schema: {
                "type": "object",
                "properties": {
                    "fromDate": from_date(),
                    "toDate": to_date(),
                    "unit": unit("Overall time bucket"),
                    "addictionUnit": unit("Granularity of the frequency count"),
                    "event": event_name(),
                    "where": where_clause(),
                    "on": on_expression(),
                    "limit": limit()
                },
                "required": ["fromDate", "toDate", "unit", "addictionUnit"]
            },
        },
        tool! {
            name: "query_profiles",
            description: "Query user profiles with an optional filter, one page at a time.",
            params: QueryProfilesParams => query_profiles,
            schema: {
                "type": "object",
                "properties": {
                    "where": where_clause(),
                    "outputProperties": output_properties(),
                    "sessionId": string("Session id from a previous page"),
                    "page": integer("Zero-based page number"),
                    "filterByCohort": object("Cohort filter, e.g. {\"id\": 123}"),
                    "includeAllUsers": boolean("Include users without profiles when filtering by cohort")
                }
            },
        },
        tool! {
            name: "get_profile",
            description: "Get one user profile by distinct id.",
            params: GetProfileParams => get_profile,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "outputProperties": output_properties()
                },
                "required": ["distinctId"]
            },
        },
        tool! {
            name: "list_cohorts",
            description: "List the saved cohorts in the project.",
            params: ListCohortsParams => list_cohorts,
            schema: {
                "type": "object",
                "properties": {}
            },
        },
        tool! {
            name: "query_cohort_members",
            description: "List the user profiles in a cohort.",
            params: CohortMembersParams => query_cohort_members,
            schema: {
                "type": "object",
                "properties": {
                    "cohortId": positive("Cohort id"),
                    "outputProperties": output_properties(),
                    "page": integer("Zero-based page number"),
                    "sessionId": string("Session id from a previous page")
                },
                "required": ["cohortId"]
            },
        },
    ]
}
