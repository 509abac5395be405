use crate::format_backend::{format_number, plural_category};
use crate::number::Number;
use crate::parser::{Argument, ArgumentKind, Message, Part, PluralArgument, SelectArgument};
use crate::{
    Args, CoreError, CoreResult, FormatBackend, FormatterId, NumberStyle, PluralCategory, Value,
    format_value,
};

/// The value `#` stands for: the innermost enclosing plural argument, less
/// its offset.
struct PoundContext<'a> {
    key: &'a str,
    number: Number,
}

pub fn render(message: &Message, args: &Args, backend: &dyn FormatBackend) -> CoreResult<String> {
    let mut output = String::new();
    render_into(&mut output, message, args, backend, None)?;
    Ok(output)
}

fn render_into(
    output: &mut String,
    message: &Message,
    args: &Args,
    backend: &dyn FormatBackend,
    pound: Option<&PoundContext<'_>>,
) -> CoreResult<()> {
    for part in &message.parts {
        match part {
            Part::Text(text) => output.push_str(text),
            Part::Pound => match pound {
                Some(context) => output.push_str(&format_number(
                    backend,
                    context.key,
                    &context.number,
                    &NumberStyle::standard(),
                )?),
                None => output.push('#'),
            },
            Part::Argument(argument) => {
                let Some(value) = args.get(&argument.name) else {
                    output.push('{');
                    output.push_str(&argument.name);
                    output.push('}');
                    continue;
                };
                render_argument(output, argument, value, args, backend, pound)?;
            }
        }
    }
    Ok(())
}

fn render_argument(
    output: &mut String,
    argument: &Argument,
    value: &Value,
    args: &Args,
    backend: &dyn FormatBackend,
    pound: Option<&PoundContext<'_>>,
) -> CoreResult<()> {
    let key = argument.name.as_str();
    let formatter = match &argument.kind {
        ArgumentKind::Simple => FormatterId::Identity,
        ArgumentKind::Number(style) => FormatterId::Number(style),
        ArgumentKind::Date(length) => FormatterId::Date(*length),
        ArgumentKind::Time(length) => FormatterId::Time(*length),
        ArgumentKind::Plural(plural) => {
            let number = Number::from_value(value)
                .ok_or_else(|| CoreError::mismatch(key, value, "number"))?;
            let (case, context) = select_plural_case(plural, key, &number, backend)?;
            return render_into(output, case, args, backend, Some(&context));
        }
        ArgumentKind::Select(select) => {
            let case = select_case(select, key, value)?;
            return render_into(output, case, args, backend, pound);
        }
    };
    output.push_str(&format_value(backend, key, formatter, value)?);
    Ok(())
}

fn select_plural_case<'m, 'k>(
    plural: &'m PluralArgument,
    key: &'k str,
    number: &Number,
    backend: &dyn FormatBackend,
) -> CoreResult<(&'m Message, PoundContext<'k>)> {
    let adjusted = number.minus(plural.offset);
    let case = match plural.exact(|exact| number.matches_exact(exact)) {
        Some(case) => case,
        None => {
            let category = plural_category(backend, key, plural.rule_type, &adjusted)?;
            plural
                .category(category)
                .or_else(|| plural.category(PluralCategory::Other))
                .ok_or_else(|| CoreError::Internal("plural argument without other case"))?
        }
    };
    Ok((
        case,
        PoundContext {
            key,
            number: adjusted,
        },
    ))
}

fn select_case<'m>(
    select: &'m SelectArgument,
    key: &str,
    value: &Value,
) -> CoreResult<&'m Message> {
    let selector = match value {
        Value::Str(text) => text.clone(),
        Value::Int(number) => number.to_string(),
        _ => return Err(CoreError::mismatch(key, value, "string")),
    };
    select
        .case(&selector)
        .or_else(|| select.case("other"))
        .ok_or_else(|| CoreError::Internal("select argument without other case"))
}
