mod ast;
mod emit;
mod parse;

#[proc_macro_derive(Record, attributes(arg))]
pub fn derive_record(_ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    // Stub out the code, but let rust-analyzer resolve the invocation
    #[cfg(not(test))]
    {
        let text = match parse::record(_ts) {
            Ok(record) => emit::emit(&record),
            Err(err) => format!("compile_error!({:?});", format!("invalid record, {err}")),
        };
        text.parse().unwrap()
    }
    #[cfg(test)]
    unimplemented!()
}

#[cfg(test)]
pub fn compile(src: &str) -> String {
    use proc_macro2::TokenStream;

    let ts = src.parse::<TokenStream>().unwrap();
    let record = parse::record(ts).unwrap();
    emit::emit(&record)
}
