//! Project management tools: annotations, lexicon schemas, lookup tables
//! and GDPR requests.

use super::schema::{
    date, entity_type, one_of_strings, positive, string, string_list, tracking_id,
};
use crate::mcp::registry::ToolSpec;
use crate::mixpanel::annotations::{
    AnnotationIdParams, CreateAnnotationParams, ListAnnotationsParams, UpdateAnnotationParams,
};
use crate::mixpanel::gdpr::{GdprDeletionParams, GdprRetrievalParams, GdprTrackingParams};
use crate::mixpanel::lookup_tables::{CreateLookupTableParams, ListLookupTablesParams};
use crate::mixpanel::schemas::{CreateSchemaParams, ListSchemasParams, SchemaKeyParams};

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        // annotations
        tool! {
            name: "list_annotations",
            description: "List project annotations, optionally within a date range.",
            params: ListAnnotationsParams => list_annotations,
            schema: {
                "type": "object",
                "properties": {
                    "fromDate": date("Earliest annotation date"),
                    "toDate": date("Latest annotation date")
                }
            },
        },
        tool! {
            name: "get_annotation",
            description: "Get one annotation by id.",
            params: AnnotationIdParams => get_annotation,
            schema: {
                "type": "object",
                "properties": {
                    "annotationId": positive("Annotation id")
                },
                "required": ["annotationId"]
            },
        },
        tool! {
            name: "create_annotation",
            description: "Create an annotation on the project timeline.",
            params: CreateAnnotationParams => create_annotation,
            schema: {
                "type": "object",
                "properties": {
                    "date": string("Annotation time, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD"),
                    "description": string("Annotation text"),
                    "tags": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "Annotation tag ids"
                    }
                },
                "required": ["date", "description"]
            },
        },
        tool! {
            name: "update_annotation",
            description: "Update an annotation's description or tags.",
            params: UpdateAnnotationParams => update_annotation,
            schema: {
                "type": "object",
                "properties": {
                    "annotationId": positive("Annotation id"),
                    "description": string("New annotation text"),
                    "tags": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "Replacement tag ids"
                    }
                },
                "required": ["annotationId"]
            },
        },
        tool! {
            name: "delete_annotation",
            description: "Delete an annotation.",
            params: AnnotationIdParams => delete_annotation,
            schema: {
                "type": "object",
                "properties": {
                    "annotationId": positive("Annotation id")
                },
                "required": ["annotationId"]
            },
        },
        // lexicon schemas
        tool! {
            name: "list_schemas",
            description: "List lexicon schemas, optionally for one entity type.",
            params: ListSchemasParams => list_schemas,
            schema: {
                "type": "object",
                "properties": {
                    "entityType": entity_type()
                }
            },
        },
        tool! {
            name: "get_schema",
            description: "Get the lexicon schema for one event or profile property.",
            params: SchemaKeyParams => get_schema,
            schema: {
                "type": "object",
                "properties": {
                    "entityType": entity_type(),
                    "name": string("Event or property name")
                },
                "required": ["entityType", "name"]
            },
        },
        tool! {
            name: "create_schema",
            description: "Create or replace a lexicon schema.",
            params: CreateSchemaParams => create_schema,
            schema: {
                "type": "object",
                "properties": {
                    "entityType": entity_type(),
                    "name": string("Event or property name"),
                    "schema": {
                        "type": "object",
                        "minProperties": 1,
                        "description": "JSON Schema document describing the entity"
                    }
                },
                "required": ["entityType", "name", "schema"]
            },
        },
        tool! {
            name: "delete_schema",
            description: "Delete a lexicon schema.",
            params: SchemaKeyParams => delete_schema,
            schema: {
                "type": "object",
                "properties": {
                    "entityType": entity_type(),
                    "name": string("Event or property name")
                },
                "required": ["entityType", "name"]
            },
        },
        // lookup tables
        tool! {
            name: "list_lookup_tables",
            description: "List the project's lookup tables.",
            params: ListLookupTablesParams => list_lookup_tables,
            schema: {
                "type": "object",
                "properties": {}
            },
        },
        tool! {
            name: "create_lookup_table",
            description: "Replace a lookup table's contents. Columns come from the first row's keys.",
            params: CreateLookupTableParams => create_lookup_table,
            schema: {
                "type": "object",
                "properties": {
                    "lookupTableId": string("Lookup table id"),
                    "rows": {
                        "type": "array",
                        "minItems": 1,
                        "items": { "type": "object" },
                        "description": "Table rows as objects keyed by column"
                    }
                },
                "required": ["lookupTableId", "rows"]
            },
        },
        // GDPR
        tool! {
            name: "create_gdpr_retrieval",
            description: "Request a GDPR/CCPA data retrieval for users. Requires the project token.",
            params: GdprRetrievalParams => create_gdpr_retrieval,
            schema: {
                "type": "object",
                "properties": {
                    "distinctIds": string_list("Users whose data to retrieve"),
                    "complianceType": one_of_strings(&["GDPR", "CCPA"], "Regulation; defaults to GDPR"),
                    "disclosureType": one_of_strings(
                        &["Data", "Categories", "Sources", "ThirdParties", "BusinessPurpose"],
                        "CCPA disclosure type"
                    )
                },
                "required": ["distinctIds"]
            },
        },
        tool! {
            name: "get_gdpr_retrieval_status",
            description: "Check the status of a data retrieval request.",
            params: GdprTrackingParams => get_gdpr_retrieval_status,
            schema: {
                "type": "object",
                "properties": {
                    "trackingId": tracking_id()
                },
                "required": ["trackingId"]
            },
        },
        tool! {
            name: "create_gdpr_deletion",
            description: "Request GDPR/CCPA deletion of users' data. Requires the project token.",
            params: GdprDeletionParams => create_gdpr_deletion,
            schema: {
                "type": "object",
                "properties": {
                    "distinctIds": string_list("Users whose data to delete"),
                    "complianceType": one_of_strings(&["GDPR", "CCPA"], "Regulation; defaults to GDPR")
                },
                "required": ["distinctIds"]
            },
        },
        tool! {
            name: "get_gdpr_deletion_status",
            description: "Check the status of a data deletion request.",
            params: GdprTrackingParams => get_gdpr_deletion_status,
            schema: {
                "type": "object",
                "properties": {
                    "trackingId": tracking_id()
                },
                "required": ["trackingId"]
            },
        },
        tool! {
            name: "cancel_gdpr_deletion",
            description: "Cancel a pending data deletion request.",
            params: GdprTrackingParams => cancel_gdpr_deletion,
            schema: {
                "type": "object",
                "properties": {
                    "trackingId": tracking_id()
                },
                "required": ["trackingId"]
            },
        },
    ]
}
