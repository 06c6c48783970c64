//! Generic CRUD workflows over any registered resource.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::domain::datatable::DataTable;
use crate::domain::descriptor::Descriptor;
use crate::domain::field::{FieldDescriptor, FieldType};
use crate::domain::metadata::EntityMetadata;
use crate::domain::permission::{Authorizer, DELETE, INSERT, SELECT, Target, UPDATE};
use crate::dto::api::{DataTableQuery, InvalidResponse};
use crate::query::PagedQuery;
use crate::query::autocomplete::AutoCompleteQuery;
use crate::query::value::QueryValue;
use crate::repository::errors::RepositoryError;
use crate::repository::{Assignments, QueryExecutor, ResourceWriter, ValueQuery};
use crate::services::datatable::{log_query, make_query_response};
use crate::services::{ServiceError, ServiceResult, check_permission};

/// JSON object received for add and edit.
pub type Payload = Map<String, Value>;

const KEY_PARAMETER: &str = "key";
const STORED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn not_found(metadata: &EntityMetadata, id: i64) -> ServiceError {
    ServiceError::NotFound(format!(
        "Entity of type {} with id of {id} could not be found",
        metadata.name
    ))
}

fn find<R, E>(repo: &E, metadata: &EntityMetadata, id: i64) -> ServiceResult<Option<R>>
where
    E: QueryExecutor<R> + ?Sized,
{
    let mut query = PagedQuery::<R>::new(format!(
        "FROM {} WHERE {} = :{KEY_PARAMETER}",
        metadata.table, metadata.key
    ))
    .parameter(KEY_PARAMETER, id);
    query.limit = Some(1);

    Ok(query.result_list(repo)?.into_iter().next())
}

/// One page of rows. Exposes the write permissions the caller holds and,
/// when requested, the column descriptor as out-of-band payload.
pub fn list<R, E, A>(
    repo: &E,
    authorizer: &A,
    metadata: &EntityMetadata,
    query: &DataTableQuery,
) -> ServiceResult<DataTable<R>>
where
    E: QueryExecutor<R> + ?Sized,
    A: Authorizer + ?Sized,
{
    log_query(query);
    check_permission(authorizer, &Target::Type(metadata.table), SELECT)?;

    let results = PagedQuery::new(format!("FROM {}", metadata.table))
        .search_fields(metadata.searchable_fields())
        .order_by(metadata.key);

    let oob = if query.include_oob {
        let descriptor = Descriptor::new(metadata)?;
        let value = serde_json::to_value(descriptor)
            .map_err(|e| RepositoryError::Unexpected(e.to_string()))?;
        Some(value)
    } else {
        None
    };

    make_query_response(
        repo,
        authorizer,
        query,
        results,
        metadata,
        oob,
        &[INSERT, UPDATE, DELETE],
    )
}

/// A single row by key.
pub fn get<R, E, A>(repo: &E, authorizer: &A, metadata: &EntityMetadata, id: i64) -> ServiceResult<R>
where
    E: QueryExecutor<R> + ?Sized,
    A: Authorizer + ?Sized,
{
    let entity = find(repo, metadata, id)?.ok_or_else(|| not_found(metadata, id))?;

    let target = Target::Instance {
        entity: metadata.table,
        key: Some(id),
    };
    check_permission(authorizer, &target, SELECT)?;

    Ok(entity)
}

pub fn delete<R, E, A>(repo: &E, authorizer: &A, metadata: &EntityMetadata, id: i64) -> ServiceResult<()>
where
    E: QueryExecutor<R> + ResourceWriter + ?Sized,
    A: Authorizer + ?Sized,
{
    if find(repo, metadata, id)?.is_none() {
        return Err(not_found(metadata, id));
    }

    let target = Target::Instance {
        entity: metadata.table,
        key: Some(id),
    };
    check_permission(authorizer, &target, DELETE)?;

    if repo.delete(metadata.table, metadata.key, id)? == 0 {
        return Err(not_found(metadata, id));
    }
    log::info!("Deleted {} {id}", metadata.name);

    Ok(())
}

/// Inserts a new row and returns its key.
pub fn add<E, A>(repo: &E, authorizer: &A, metadata: &EntityMetadata, payload: &Payload) -> ServiceResult<i64>
where
    E: ResourceWriter + ?Sized,
    A: Authorizer + ?Sized,
{
    let target = Target::Instance {
        entity: metadata.table,
        key: None,
    };
    check_permission(authorizer, &target, INSERT)?;

    let mut invalid = InvalidResponse::default();
    let assignments = assignments(metadata, payload, &mut invalid);
    for field in metadata.fields.iter().filter(|f| f.required) {
        let present = assignments.iter().any(|(column, _)| column == field.name);
        if !present && !invalid.has_error(field.name) {
            invalid.add_error(field.name, empty_message(field));
        }
    }
    if !invalid.is_empty() {
        return Err(ServiceError::Invalid(invalid));
    }

    let id = repo.insert(metadata.table, &assignments)?;
    log::info!("Added {} {id}", metadata.name);

    Ok(id)
}

/// Overwrites the editable fields present in `payload` on a stored row.
pub fn edit<R, E, A>(
    repo: &E,
    authorizer: &A,
    metadata: &EntityMetadata,
    id: i64,
    payload: &Payload,
) -> ServiceResult<()>
where
    E: QueryExecutor<R> + ResourceWriter + ?Sized,
    A: Authorizer + ?Sized,
{
    if find(repo, metadata, id)?.is_none() {
        return Err(not_found(metadata, id));
    }

    let target = Target::Instance {
        entity: metadata.table,
        key: Some(id),
    };
    check_permission(authorizer, &target, INSERT)?;
    check_permission(authorizer, &target, UPDATE)?;

    let mut invalid = InvalidResponse::default();
    let assignments = assignments(metadata, payload, &mut invalid);
    if !invalid.is_empty() {
        return Err(ServiceError::Invalid(invalid));
    }
    repo.update(metadata.table, metadata.key, id, &assignments)?;
    log::info!("Updated {} {id}", metadata.name);

    Ok(())
}

/// Distinct values of an autocomplete-enabled field containing `term`.
pub fn autocomplete<E, A>(
    repo: &E,
    authorizer: &A,
    metadata: &EntityMetadata,
    field: &str,
    term: Option<&str>,
) -> ServiceResult<Vec<String>>
where
    E: ValueQuery + ?Sized,
    A: Authorizer + ?Sized,
{
    check_permission(authorizer, &Target::Type(metadata.table), SELECT)?;
    let field = metadata.field(field)?;
    if !field.autocomplete {
        return Err(ServiceError::NotFound(format!(
            "Field {} of {} does not support autocompletion",
            field.name, metadata.name
        )));
    }

    let values = AutoCompleteQuery::new(metadata.table, field.name)
        .term(term)
        .fetch(repo)?;

    Ok(values)
}

pub fn descriptor<A>(authorizer: &A, metadata: &EntityMetadata) -> ServiceResult<Descriptor>
where
    A: Authorizer + ?Sized,
{
    check_permission(authorizer, &Target::Type(metadata.table), SELECT)?;
    Ok(Descriptor::new(metadata)?)
}

fn empty_message(field: &FieldDescriptor) -> String {
    format!("{} must not be empty", field.display_name())
}

/// Validated column values for the editable fields present in `payload`.
///
/// Every rejected value is recorded in `invalid`. Keys naming no field of
/// the entity are global errors.
fn assignments(
    metadata: &EntityMetadata,
    payload: &Payload,
    invalid: &mut InvalidResponse,
) -> Assignments {
    let mut assignments = Assignments::new();

    for (name, value) in payload {
        let Ok(field) = metadata.field(name) else {
            invalid.add_global_error(format!("Unknown field {name} for {}", metadata.name));
            continue;
        };
        if !field.editable {
            continue;
        }

        let value = match convert(field, value) {
            Ok(value) => value,
            Err(message) => {
                invalid.add_error(field.name, message);
                continue;
            }
        };
        let empty = match &value {
            QueryValue::Null => true,
            QueryValue::Text(text) => text.trim().is_empty(),
            _ => false,
        };
        if field.required && empty {
            invalid.add_error(field.name, empty_message(field));
            continue;
        }

        assignments.push((field.name.to_string(), value));
    }

    assignments
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> String {
    format!(
        "{} expects a value of type {}, got {value}",
        field.display_name(),
        field.field_type.as_str()
    )
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Converts a JSON value to the column value of `field`, or describes why
/// it cannot be.
fn convert(field: &FieldDescriptor, value: &Value) -> Result<QueryValue, String> {
    let converted = match (field.field_type, value) {
        (_, Value::Null) => Some(QueryValue::Null),
        (FieldType::String, Value::String(text)) => Some(QueryValue::Text(text.clone())),
        (FieldType::String, Value::Number(number)) => Some(QueryValue::Text(number.to_string())),
        (FieldType::Integer, Value::Number(number)) => number.as_i64().map(QueryValue::Integer),
        (FieldType::Integer, Value::String(text)) => {
            text.trim().parse().ok().map(QueryValue::Integer)
        }
        (FieldType::Decimal, Value::Number(number)) => number.as_f64().map(QueryValue::Real),
        (FieldType::Decimal, Value::String(text)) => text.trim().parse().ok().map(QueryValue::Real),
        (FieldType::Boolean, Value::Bool(flag)) => Some(QueryValue::Bool(*flag)),
        (FieldType::Boolean, Value::String(text)) => text.trim().parse().ok().map(QueryValue::Bool),
        (FieldType::Date, Value::String(text)) => parse_date(text.trim())
            .map(|date| QueryValue::Text(date.format(STORED_DATE_FORMAT).to_string())),
        _ => None,
    };

    converted.ok_or_else(|| mismatch(field, value))
}
