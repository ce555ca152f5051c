use actix_web::{error, web, HttpResponse, Result};
use defeasible::{
    compute_all_justifications, explain,
    parse::{parse_formula, parse_knowledge_base},
    stratify, DpllOracle, ReasonerKind,
};

use crate::{parse_params, EntailForm, JustifyForm};

pub(crate) async fn entail(
    reasoner: web::Path<String>,
    form: web::Form<EntailForm>,
) -> Result<HttpResponse> {
    let kind = ReasonerKind::try_from(reasoner.as_str()).map_err(error::ErrorNotFound)?;
    let EntailForm {
        knowledge_base,
        query,
        params,
        explain: with_justification,
    } = form.0;
    let params = parse_params(params)?;

    let kb = parse_knowledge_base(&knowledge_base).map_err(error::ErrorBadRequest)?;
    let query = parse_formula(&query).map_err(error::ErrorBadRequest)?;

    let oracle = DpllOracle::from_params(&params);
    let base_rank = stratify(&kb, &oracle, &params).map_err(error::ErrorBadRequest)?;
    let mut res = kind
        .entail(&oracle, &params, &base_rank, &query)
        .map_err(error::ErrorBadRequest)?;

    if with_justification.unwrap_or(false) {
        res = explain(&oracle, res).map_err(error::ErrorBadRequest)?;
    }

    Ok(HttpResponse::Ok().json(res))
}

pub(crate) async fn justify(form: web::Form<JustifyForm>) -> Result<HttpResponse> {
    let JustifyForm {
        knowledge_base,
        query,
    } = form.0;

    let kb = parse_knowledge_base(&knowledge_base).map_err(error::ErrorBadRequest)?;
    let query = parse_formula(&query).map_err(error::ErrorBadRequest)?;

    let justifications =
        compute_all_justifications(&DpllOracle::new(), &kb.materialise(), &query.materialise())
            .map_err(error::ErrorBadRequest)?;

    Ok(HttpResponse::Ok().json(justifications))
}
