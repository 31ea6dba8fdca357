use crate::{
    rt::{store, value_decoder},
    Command, Error, Record, Result,
};

/// Fills the flags nobody set on the command line: a `default` literal goes
/// through the flag's value decoder, otherwise the field is copied from the
/// command's default-flags record when there is one.
pub(crate) fn resolve<F: Record>(
    cmd: &Command,
    flags: &mut F,
    set: &[bool],
    fallback: Option<&F>,
) -> Result<()> {
    for flag in &cmd.get_schema().flags {
        if set[flag.slot] {
            continue;
        }
        match (flag.default, fallback) {
            (Some(literal), _) => {
                let decode = value_decoder(cmd, flag.ty, flag.field);
                let value = decode(literal, &flag.tags).map_err(|source| Error::DecodeFlag {
                    flag: format!("--{}", flag.long),
                    source,
                })?;
                store(flags, flag.slot, 0, value, flag.field);
            }
            (None, Some(fallback)) => flags.adopt(flag.slot, fallback),
            (None, None) => (),
        }
    }
    Ok(())
}
