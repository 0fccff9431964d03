// crates/callable-registry-core/src/runtime/mapper.rs
// ============================================================================
// Module: Field Mapper
// Description: Field-by-field mapping between callable kinds and their DTOs.
// Purpose: Provide the default CallableMapper for every built-in kind.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`FieldMapper`] copies fields one to one. Merges replace every mutable
//! header and payload field with the submitted value; identifier and version
//! are left untouched because the header keeps them private.

use crate::core::CallableHeader;
use crate::core::CallableHeaderDto;
use crate::core::CallableId;
use crate::core::SliceFunction;
use crate::core::SliceFunctionDto;
use crate::core::TestFunction;
use crate::core::TestFunctionDto;
use crate::core::TransformationFunction;
use crate::core::TransformationFunctionDto;
use crate::interfaces::CallableMapper;

/// Default field-by-field mapper for the built-in callable kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

/// Builds a header for a new entity from a submission.
fn header_from_dto(dto: CallableHeaderDto, id: CallableId) -> CallableHeader {
    let mut header = CallableHeader::new(id, String::new(), String::new());
    merge_header(&mut header, dto);
    header
}

/// Copies mutable header fields from a submission.
fn merge_header(header: &mut CallableHeader, dto: CallableHeaderDto) {
    header.name = dto.name;
    header.module = dto.module;
    header.display_name = dto.display_name;
    header.doc = dto.doc;
    header.module_doc = dto.module_doc;
    header.code = dto.code;
    header.tags = dto.tags;
    header.args = dto.args;
}

/// Renders a stored header, always carrying identifier and version.
fn header_to_dto(header: &CallableHeader) -> CallableHeaderDto {
    CallableHeaderDto {
        uuid: Some(header.id()),
        name: header.name.clone(),
        module: header.module.clone(),
        version: Some(header.version().get()),
        display_name: header.display_name.clone(),
        doc: header.doc.clone(),
        module_doc: header.module_doc.clone(),
        code: header.code.clone(),
        tags: header.tags.clone(),
        args: header.args.clone(),
    }
}

impl CallableMapper<SliceFunction> for FieldMapper {
    type Dto = SliceFunctionDto;

    fn to_entity(&self, dto: SliceFunctionDto, id: CallableId) -> SliceFunction {
        SliceFunction {
            header: header_from_dto(dto.header, id),
            cell_level: dto.cell_level,
            column_type: dto.column_type,
            process_type: dto.process_type,
            clauses: dto.clauses,
        }
    }

    fn merge(&self, existing: &mut SliceFunction, dto: SliceFunctionDto) {
        merge_header(&mut existing.header, dto.header);
        existing.cell_level = dto.cell_level;
        existing.column_type = dto.column_type;
        existing.process_type = dto.process_type;
        existing.clauses = dto.clauses;
    }

    fn to_dto(&self, entity: &SliceFunction) -> SliceFunctionDto {
        SliceFunctionDto {
            header: header_to_dto(&entity.header),
            cell_level: entity.cell_level,
            column_type: entity.column_type.clone(),
            process_type: entity.process_type,
            clauses: entity.clauses.clone(),
        }
    }
}

impl CallableMapper<TransformationFunction> for FieldMapper {
    type Dto = TransformationFunctionDto;

    fn to_entity(&self, dto: TransformationFunctionDto, id: CallableId) -> TransformationFunction {
        TransformationFunction {
            header: header_from_dto(dto.header, id),
            cell_level: dto.cell_level,
            column_type: dto.column_type,
            process_type: dto.process_type,
        }
    }

    fn merge(&self, existing: &mut TransformationFunction, dto: TransformationFunctionDto) {
        merge_header(&mut existing.header, dto.header);
        existing.cell_level = dto.cell_level;
        existing.column_type = dto.column_type;
        existing.process_type = dto.process_type;
    }

    fn to_dto(&self, entity: &TransformationFunction) -> TransformationFunctionDto {
        TransformationFunctionDto {
            header: header_to_dto(&entity.header),
            cell_level: entity.cell_level,
            column_type: entity.column_type.clone(),
            process_type: entity.process_type,
        }
    }
}

impl CallableMapper<TestFunction> for FieldMapper {
    type Dto = TestFunctionDto;

    fn to_entity(&self, dto: TestFunctionDto, id: CallableId) -> TestFunction {
        TestFunction {
            header: header_from_dto(dto.header, id),
            debug_description: dto.debug_description,
        }
    }

    fn merge(&self, existing: &mut TestFunction, dto: TestFunctionDto) {
        merge_header(&mut existing.header, dto.header);
        existing.debug_description = dto.debug_description;
    }

    fn to_dto(&self, entity: &TestFunction) -> TestFunctionDto {
        TestFunctionDto {
            header: header_to_dto(&entity.header),
            debug_description: entity.debug_description.clone(),
        }
    }
}
