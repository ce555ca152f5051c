use actix_web::{error, web, HttpResponse, Result};
use defeasible::{parse::parse_knowledge_base, stratify, DpllOracle};

use crate::{parse_params, RankForm};

pub(crate) async fn base_rank(form: web::Form<RankForm>) -> Result<HttpResponse> {
    let RankForm {
        knowledge_base,
        params,
    } = form.0;
    let params = parse_params(params)?;

    let kb = parse_knowledge_base(&knowledge_base).map_err(error::ErrorBadRequest)?;
    let oracle = DpllOracle::from_params(&params);
    let base_rank = stratify(&kb, &oracle, &params).map_err(error::ErrorBadRequest)?;

    Ok(HttpResponse::Ok().json(base_rank))
}
