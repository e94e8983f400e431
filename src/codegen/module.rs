//! Primary module: records, custom types and codecs for one `.proto` file

use super::{header, list, output, paren};
use crate::model::{Enum, Message, OneOf, SchemaFile};
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::fmt::{self, Write};

const HELPERS: &str = "\
uselessDeclarationToPreventErrorDueToEmptyOutputFile = 42


requiredWithoutDefault : String -> JD.Decoder a -> JD.Decoder (a -> b) -> JD.Decoder b
requiredWithoutDefault name decoder d =
    field (JD.field name decoder) d


requiredFieldEncoderWithoutDefault : String -> (a -> JE.Value) -> a -> Maybe ( String, JE.Value )
requiredFieldEncoderWithoutDefault name encoder v =
    Just ( name, encoder v )
";

/// Render the module for one file
///
/// `imports` are the module names of the file's rendered dependencies.
pub fn render(file: &SchemaFile, imports: &[String]) -> Result<File, GeneratorError> {
    output(file.output_file_name(), render_text(file, imports))
}

fn render_text(file: &SchemaFile, imports: &[String]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    header(&mut out, &file.module_name, &[file.path.as_str()])?;
    writeln!(out)?;
    writeln!(out, "import Protobuf exposing (..)")?;
    writeln!(out)?;
    writeln!(out, "import Json.Decode as JD")?;
    writeln!(out, "import Json.Encode as JE")?;
    if file.uses_maps() || file.has_enums() {
        writeln!(out, "import Dict")?;
    }
    if !file.identifier_types().is_empty() {
        writeln!(out, "import Ids")?;
    }
    for import in imports {
        writeln!(out, "import {} exposing (..)", import)?;
    }
    write!(out, "\n\n{}", HELPERS)?;

    for e in &file.enums {
        write!(out, "\n\n")?;
        render_enum(&mut out, e)?;
    }
    for m in &file.messages {
        write!(out, "\n\n")?;
        render_message(&mut out, m)?;
    }

    Ok(out)
}

fn render_message(out: &mut String, message: &Message) -> fmt::Result {
    render_record(out, message)?;
    for oneof in &message.oneofs {
        write!(out, "\n\n")?;
        render_oneof(out, oneof)?;
    }
    for e in &message.enums {
        write!(out, "\n\n")?;
        render_enum(out, e)?;
    }
    for nested in &message.messages {
        write!(out, "\n\n")?;
        render_message(out, nested)?;
    }
    Ok(())
}

fn render_record(out: &mut String, message: &Message) -> fmt::Result {
    writeln!(out, "type alias {} =", message.name)?;
    if message.fields.is_empty() {
        writeln!(out, "    {{}}")?;
    }
    for (i, field) in message.fields.iter().enumerate() {
        let sep = if i == 0 { "{" } else { "," };
        write!(out, "    {} {} : {}", sep, field.name, field.ty)?;
        if let Some(number) = field.number {
            write!(out, " -- {}", number)?;
        }
        writeln!(out)?;
    }
    if !message.fields.is_empty() {
        writeln!(out, "    }}")?;
    }

    let decoder = message.decoder();
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : JD.Decoder {}", decoder, message.name)?;
    writeln!(out, "{} =", decoder)?;
    writeln!(out, "    JD.lazy <| \\_ -> decode {}", message.name)?;
    for field in &message.fields {
        writeln!(out, "        |> {}", field.decoder)?;
    }

    let encoder = message.encoder();
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : {} -> JE.Value", encoder, message.name)?;
    writeln!(out, "{} v =", encoder)?;
    writeln!(out, "    JE.object <| List.filterMap identity <|")?;
    list(
        out,
        "        ",
        message.fields.iter().map(|f| format!("({})", f.encoder)),
    )
}

fn render_oneof(out: &mut String, oneof: &OneOf) -> fmt::Result {
    writeln!(out, "type {}", oneof.name)?;
    for (i, variant) in oneof.variants.iter().enumerate() {
        let sep = if i == 0 { "=" } else { "|" };
        writeln!(out, "    {} {} {}", sep, variant.name, paren(&variant.ty.to_string()))?;
    }

    let decoder = oneof.decoder();
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : JD.Decoder {}", decoder, oneof.name)?;
    writeln!(out, "{} =", decoder)?;
    writeln!(out, "    JD.lazy <| \\_ -> JD.oneOf")?;
    let alternatives = oneof
        .variants
        .iter()
        .map(|v| {
            format!(
                "JD.map {} (JD.field \"{}\" {})",
                v.name, v.json_name, v.decoder
            )
        })
        .chain(std::iter::once(format!(
            "JD.fail \"{}_Unspecified\"",
            oneof.name
        )));
    list(out, "        ", alternatives)?;

    let encoder = oneof.encoder();
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : {} -> Maybe ( String, JE.Value )", encoder, oneof.name)?;
    writeln!(out, "{} v =", encoder)?;
    writeln!(out, "    case v of")?;
    for (i, variant) in oneof.variants.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "        {} x ->", variant.name)?;
        writeln!(
            out,
            "            Just ( \"{}\", {} x )",
            variant.json_name, variant.encoder
        )?;
    }
    Ok(())
}

fn render_enum(out: &mut String, e: &Enum) -> fmt::Result {
    writeln!(out, "type {}", e.name)?;
    for (i, variant) in e.variants.iter().enumerate() {
        let sep = if i == 0 { "=" } else { "|" };
        writeln!(out, "    {} {} -- {}", sep, variant.name, variant.number)?;
    }

    let decoder = e.decoder();
    let default = e.default_variable();
    let to_string = e.to_string_fn();
    let from_string = e.from_string_fn();
    let all = e.all();
    let dict = e.dict();
    let encoder = e.encoder();

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : JD.Decoder {}", decoder, e.name)?;
    writeln!(out, "{} =", decoder)?;
    writeln!(
        out,
        "    JD.map (Maybe.withDefault {} << {}) JD.string",
        default, from_string
    )?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : {}", default, e.name)?;
    writeln!(out, "{} =", default)?;
    writeln!(out, "    {}", e.default_variant().name)?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : {} -> String", to_string, e.name)?;
    writeln!(out, "{} v =", to_string)?;
    writeln!(out, "    case v of")?;
    for (i, variant) in e.variants.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "        {} ->", variant.name)?;
        writeln!(out, "            \"{}\"", variant.json_name)?;
    }

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : List {}", all, e.name)?;
    writeln!(out, "{} =", all)?;
    list(out, "    ", e.variants.iter().map(|v| v.name.as_str()))?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : Dict.Dict String {}", dict, e.name)?;
    writeln!(out, "{} =", dict)?;
    writeln!(out, "    Dict.fromList <|")?;
    writeln!(out, "        List.map")?;
    writeln!(out, "            (\\v -> ( {} v, v ))", to_string)?;
    writeln!(out, "            {}", all)?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : String -> Maybe {}", from_string, e.name)?;
    writeln!(out, "{} s =", from_string)?;
    writeln!(out, "    Dict.get s {}", dict)?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{} : {} -> JE.Value", encoder, e.name)?;
    writeln!(out, "{} =", encoder)?;
    writeln!(out, "    JE.string << {}", to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumVariant, OneOfVariant};
    use crate::types::FieldType;

    fn status() -> Enum {
        Enum {
            name: "Status".to_string(),
            variants: vec![
                EnumVariant {
                    name: "StatusUnknown".to_string(),
                    number: 0,
                    json_name: "STATUS_UNKNOWN".to_string(),
                },
                EnumVariant {
                    name: "StatusActive".to_string(),
                    number: 1,
                    json_name: "STATUS_ACTIVE".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_enum_rendering() {
        let mut out = String::new();
        render_enum(&mut out, &status()).unwrap();

        assert!(out.starts_with("type Status\n    = StatusUnknown -- 0\n    | StatusActive -- 1\n"));
        assert!(out.contains("statusDefault =\n    StatusUnknown\n"));
        assert!(out.contains("JD.map (Maybe.withDefault statusDefault << statusFromString) JD.string"));
        assert!(out.contains("        StatusActive ->\n            \"STATUS_ACTIVE\"\n"));
        assert!(out.contains("statusAll =\n    [ StatusUnknown\n    , StatusActive\n    ]\n"));
        assert!(out.ends_with("statusEncoder =\n    JE.string << statusToString\n"));
    }

    #[test]
    fn test_oneof_rendering() {
        let oneof = OneOf {
            name: "Payment_Method".to_string(),
            source_name: "method".to_string(),
            variants: vec![OneOfVariant {
                name: "Payment_Method_Tags".to_string(),
                json_name: "tags".to_string(),
                ty: FieldType::Named("Payment_Tags".to_string()),
                encoder: "payment_TagsEncoder".to_string(),
                decoder: "payment_TagsDecoder".to_string(),
            }],
        };

        let mut out = String::new();
        render_oneof(&mut out, &oneof).unwrap();
        assert!(out.contains("type Payment_Method\n    = Payment_Method_Tags Payment_Tags\n"));
        assert!(out.contains(
            "        [ JD.map Payment_Method_Tags (JD.field \"tags\" payment_TagsDecoder)\n        , JD.fail \"Payment_Method_Unspecified\"\n        ]\n"
        ));
        assert!(out.contains("            Just ( \"tags\", payment_TagsEncoder x )\n"));
    }

    #[test]
    fn test_empty_record() {
        let message = Message {
            name: "Empty".to_string(),
            full_name: "shop.Empty".to_string(),
            singleton: false,
            fields: vec![],
            enums: vec![],
            oneofs: vec![],
            messages: vec![],
        };

        let mut out = String::new();
        render_record(&mut out, &message).unwrap();
        assert!(out.starts_with("type alias Empty =\n    {}\n"));
        assert!(out.contains("    JD.lazy <| \\_ -> decode Empty\n"));
        assert!(out.ends_with("        []\n"));
    }
}
