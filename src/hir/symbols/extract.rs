//! Extraction entry point and per-definition extractors.
//!
//! Walks a [`ProtoFile`] depth-first, registering every named definition
//! under its full name and recording every non-scalar type occurrence.
//! Nodes with an empty name are skipped together with everything they
//! contain.

use std::sync::Arc;

use super::context::ExtractionContext;
use super::types::{FileSymbols, SymbolKind, TypeRefKind};
use crate::syntax::{
    Constant, Definition, EnumDefinition, ExtendDefinition, FieldDefinition, GroupDefinition,
    MapFieldDefinition, MessageBody, MessageDefinition, MessageElement, OneofDefinition,
    OneofElement, ProtoFile, ServiceDefinition, TypeName, is_deprecated,
};

/// Extract all symbols and type references from a file.
pub fn extract_symbols(file: &ProtoFile) -> FileSymbols {
    let mut ctx = ExtractionContext::new(&file.uri, file.package_name());
    for definition in &file.definitions {
        match definition {
            Definition::Message(m) => extract_message(&mut ctx, m),
            Definition::Enum(e) => extract_enum(&mut ctx, e),
            Definition::Service(s) => extract_service(&mut ctx, s),
            Definition::Extend(x) => extract_extend(&mut ctx, x),
        }
    }
    ctx.out
}

fn extract_message(ctx: &mut ExtractionContext, message: &MessageDefinition) {
    if message.name.is_empty() {
        return;
    }
    ctx.add_symbol(
        &message.name,
        SymbolKind::Message,
        message.span,
        message.name_span,
        message.doc.as_deref(),
        None,
        message
            .options()
            .any(|o| o.name.is("deprecated") && o.value == Constant::Bool(true)),
    );
    ctx.push_scope(&message.name);
    extract_body(ctx, &message.elements);
    ctx.pop_scope();
}

fn extract_body(ctx: &mut ExtractionContext, elements: &[MessageElement]) {
    for element in elements {
        match element {
            MessageElement::Field(f) => extract_field(ctx, f, SymbolKind::Field),
            MessageElement::MapField(m) => extract_map_field(ctx, m),
            MessageElement::Group(g) => extract_group(ctx, g, SymbolKind::Field),
            MessageElement::Oneof(o) => extract_oneof(ctx, o),
            MessageElement::Message(m) => extract_message(ctx, m),
            MessageElement::Enum(e) => extract_enum(ctx, e),
            MessageElement::Extend(x) => extract_extend(ctx, x),
            MessageElement::Reserved(_)
            | MessageElement::Extensions(_)
            | MessageElement::Option(_) => {}
        }
    }
}

fn field_detail(field: &FieldDefinition) -> String {
    match field.label {
        Some(label) => format!("{} {}", label.as_str(), field.field_type.name),
        None => field.field_type.name.to_string(),
    }
}

fn add_type_ref(ctx: &mut ExtractionContext, ty: &TypeName, kind: TypeRefKind, source: &Arc<str>) {
    if ty.is_empty() || ty.is_scalar() {
        return;
    }
    ctx.add_type_ref(&ty.name, ty.span, kind, source);
}

fn extract_field(ctx: &mut ExtractionContext, field: &FieldDefinition, kind: SymbolKind) {
    if field.name.is_empty() {
        return;
    }
    let full_name = ctx.add_symbol(
        &field.name,
        kind,
        field.span,
        field.name_span,
        field.doc.as_deref(),
        Some(field_detail(field)),
        is_deprecated(&field.options),
    );
    add_type_ref(ctx, &field.field_type, TypeRefKind::FieldType, &full_name);
}

fn extract_map_field(ctx: &mut ExtractionContext, map: &MapFieldDefinition) {
    if map.name.is_empty() {
        return;
    }
    let full_name = ctx.add_symbol(
        &map.name,
        SymbolKind::MapField,
        map.span,
        map.name_span,
        map.doc.as_deref(),
        Some(format!("map<{}, {}>", map.key_type.name, map.value_type.name)),
        is_deprecated(&map.options),
    );
    add_type_ref(ctx, &map.value_type, TypeRefKind::MapValueType, &full_name);
}

/// A group declares a message type and a field named after it in lower case.
fn extract_group(ctx: &mut ExtractionContext, group: &GroupDefinition, field_kind: SymbolKind) {
    if group.name.is_empty() {
        return;
    }
    ctx.add_symbol(
        &group.name,
        SymbolKind::Group,
        group.span,
        group.name_span,
        group.doc.as_deref(),
        None,
        false,
    );
    let detail = match group.label {
        Some(label) => format!("{} group {}", label.as_str(), group.name),
        None => format!("group {}", group.name),
    };
    ctx.add_symbol(
        &group.field_name(),
        field_kind,
        group.span,
        group.name_span,
        None,
        Some(detail),
        is_deprecated(&group.options),
    );
    ctx.push_scope(&group.name);
    extract_body(ctx, group.elements());
    ctx.pop_scope();
}

/// Oneof members are fields of the enclosing message.
fn extract_oneof(ctx: &mut ExtractionContext, oneof: &OneofDefinition) {
    if oneof.name.is_empty() {
        return;
    }
    ctx.add_symbol(
        &oneof.name,
        SymbolKind::Oneof,
        oneof.span,
        oneof.name_span,
        oneof.doc.as_deref(),
        None,
        false,
    );
    for element in &oneof.elements {
        match element {
            OneofElement::Field(f) => extract_field(ctx, f, SymbolKind::Field),
            OneofElement::Group(g) => extract_group(ctx, g, SymbolKind::Field),
            OneofElement::Option(_) => {}
        }
    }
}

fn extract_enum(ctx: &mut ExtractionContext, enumeration: &EnumDefinition) {
    if enumeration.name.is_empty() {
        return;
    }
    ctx.add_symbol(
        &enumeration.name,
        SymbolKind::Enum,
        enumeration.span,
        enumeration.name_span,
        enumeration.doc.as_deref(),
        None,
        is_deprecated(&enumeration.options),
    );
    ctx.push_scope(&enumeration.name);
    for value in &enumeration.values {
        if value.name.is_empty() {
            continue;
        }
        ctx.add_symbol(
            &value.name,
            SymbolKind::EnumValue,
            value.span,
            value.name_span,
            value.doc.as_deref(),
            value.number.map(|n| n.to_string()),
            is_deprecated(&value.options),
        );
    }
    ctx.pop_scope();
}

fn extract_service(ctx: &mut ExtractionContext, service: &ServiceDefinition) {
    if service.name.is_empty() {
        return;
    }
    ctx.add_symbol(
        &service.name,
        SymbolKind::Service,
        service.span,
        service.name_span,
        service.doc.as_deref(),
        None,
        is_deprecated(&service.options),
    );
    ctx.push_scope(&service.name);
    for rpc in &service.rpcs {
        if rpc.name.is_empty() {
            continue;
        }
        let full_name = ctx.add_symbol(
            &rpc.name,
            SymbolKind::Rpc,
            rpc.span,
            rpc.name_span,
            rpc.doc.as_deref(),
            Some(rpc.signature()),
            is_deprecated(&rpc.options),
        );
        add_type_ref(ctx, &rpc.request.type_name, TypeRefKind::RpcRequest, &full_name);
        add_type_ref(ctx, &rpc.response.type_name, TypeRefKind::RpcResponse, &full_name);
    }
    ctx.pop_scope();
}

/// Extension fields are registered in the scope that contains the block.
fn extract_extend(ctx: &mut ExtractionContext, extend: &ExtendDefinition) {
    let scope = ctx.scope();
    add_type_ref(ctx, &extend.extendee, TypeRefKind::Extendee, &scope);
    for field in &extend.fields {
        extract_field(ctx, field, SymbolKind::Extension);
    }
    for group in &extend.groups {
        extract_group(ctx, group, SymbolKind::Extension);
    }
}
