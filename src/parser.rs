// This file contains the parser module, responsible for turning document text into the summary model.

pub mod swagger;

pub use swagger::{
    parse_openapi_value,
    parse_swagger_str,
    SwaggerSpec,
    ApiPath,
    ApiOperation,
    ApiParameter,
    ApiRequestBody,
    ApiMediaType,
    ApiResponse,
    ParserError,
    Result,
};
