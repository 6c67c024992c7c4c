//! Profile and group mutation tools. All of them require the project token.

use serde_json::{Map, Value};

use super::schema::{boolean, distinct_id, group_id, group_key, properties, string_list};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mixpanel::engage::{
    GroupDeleteParams, GroupPropertiesParams, GroupUnsetParams, ProfileDeleteParams,
    ProfilePropertiesParams, ProfileUnsetParams,
};
use crate::mixpanel::{EngageOperation, MixpanelClient, parse_params};

type PropertyOperation = fn(Map<String, Value>) -> EngageOperation;

fn profile_properties(client: &MixpanelClient, args: Value, op: PropertyOperation) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: ProfilePropertiesParams = parse_params(args)?;
        client.update_profile(&p.distinct_id, op(p.properties)).await
    })
}

fn group_properties(client: &MixpanelClient, args: Value, op: PropertyOperation) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: GroupPropertiesParams = parse_params(args)?;
        client
            .update_group(&p.group_key, &p.group_id, op(p.properties))
            .await
    })
}

fn profile_set(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::Set)
}

fn profile_set_once(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::SetOnce)
}

fn profile_increment(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::Add)
}

fn profile_append(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::Append)
}

fn profile_remove(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::Remove)
}

fn profile_union(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    profile_properties(client, args, EngageOperation::Union)
}

fn profile_unset(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: ProfileUnsetParams = parse_params(args)?;
        client
            .update_profile(&p.distinct_id, EngageOperation::Unset(p.property_names))
            .await
    })
}

fn profile_delete(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: ProfileDeleteParams = parse_params(args)?;
        let op = EngageOperation::Delete {
            ignore_alias: p.ignore_alias,
        };
        client.update_profile(&p.distinct_id, op).await
    })
}

fn group_set(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    group_properties(client, args, EngageOperation::Set)
}

fn group_set_once(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    group_properties(client, args, EngageOperation::SetOnce)
}

fn group_remove(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    group_properties(client, args, EngageOperation::Remove)
}

fn group_union(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    group_properties(client, args, EngageOperation::Union)
}

fn group_unset(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: GroupUnsetParams = parse_params(args)?;
        client
            .update_group(&p.group_key, &p.group_id, EngageOperation::Unset(p.property_names))
            .await
    })
}

fn group_delete(client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let p: GroupDeleteParams = parse_params(args)?;
        let op = EngageOperation::Delete {
            ignore_alias: false,
        };
        client.update_group(&p.group_key, &p.group_id, op).await
    })
}

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        tool! {
            name: "profile_set",
            description: "Set properties on a user profile, overwriting existing values.",
            handler: profile_set,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": properties("Properties to set")
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_set_once",
            description: "Set properties on a user profile only where they are not already set.",
            handler: profile_set_once,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": properties("Properties to set if absent")
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_increment",
            description: "Increment numeric properties on a user profile.",
            handler: profile_increment,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": {
                        "type": "object",
                        "minProperties": 1,
                        "additionalProperties": { "type": "number" },
                        "description": "Amounts to add, keyed by property"
                    }
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_append",
            description: "Append values to list properties on a user profile.",
            handler: profile_append,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": properties("Values to append, keyed by list property")
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_remove",
            description: "Remove values from list properties on a user profile.",
            handler: profile_remove,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": properties("Values to remove, keyed by list property")
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_union",
            description: "Merge lists into list properties on a user profile, skipping duplicates.",
            handler: profile_union,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "properties": {
                        "type": "object",
                        "minProperties": 1,
                        "additionalProperties": { "type": "array" },
                        "description": "Lists to merge, keyed by property"
                    }
                },
                "required": ["distinctId", "properties"]
            },
        },
        tool! {
            name: "profile_unset",
            description: "Remove properties from a user profile.",
            handler: profile_unset,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "propertyNames": string_list("Properties to remove")
                },
                "required": ["distinctId", "propertyNames"]
            },
        },
        tool! {
            name: "profile_delete",
            description: "Delete a user profile.",
            handler: profile_delete,
            schema: {
                "type": "object",
                "properties": {
                    "distinctId": distinct_id(),
                    "ignoreAlias": boolean("Do not follow aliases to the original profile")
                },
                "required": ["distinctId"]
            },
        },
        tool! {
            name: "group_set",
            description: "Set properties on a group profile, overwriting existing values.",
            handler: group_set,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id(),
                    "properties": properties("Properties to set")
                },
                "required": ["groupKey", "groupId", "properties"]
            },
        },
        tool! {
            name: "group_set_once",
            description: "Set properties on a group profile only where they are not already set.",
            handler: group_set_once,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id(),
                    "properties": properties("Properties to set if absent")
                },
                "required": ["groupKey", "groupId", "properties"]
            },
        },
        tool! {
            name: "group_remove",
            description: "Remove values from list properties on a group profile.",
            handler: group_remove,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id(),
                    "properties": properties("Values to remove, keyed by list property")
                },
                "required": ["groupKey", "groupId", "properties"]
            },
        },
        tool! {
            name: "group_union",
            description: "Merge lists into list properties on a group profile, skipping duplicates.",
            handler: group_union,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id(),
                    "properties": {
                        "type": "object",
                        "minProperties": 1,
                        "additionalProperties": { "type": "array" },
                        "description": "Lists to merge, keyed by property"
                    }
                },
                "required": ["groupKey", "groupId", "properties"]
            },
        },
        tool! {
            name: "group_unset",
            description: "Remove properties from a group profile.",
            handler: group_unset,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id(),
                    "propertyNames": string_list("Properties to remove")
                },
                "required": ["groupKey", "groupId", "propertyNames"]
            },
        },
        tool! {
            name: "group_delete",
            description: "Delete a group profile.",
            handler: group_delete,
            schema: {
                "type": "object",
                "properties": {
                    "groupKey": group_key(),
                    "groupId": group_id()
                },
                "required": ["groupKey", "groupId"]
            },
        },
    ]
}
